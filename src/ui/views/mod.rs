mod book_detail;
mod book_list;

pub use book_detail::BookDetailView;
pub use book_list::BookListView;
