mod category_picker;
mod edit_form;
mod input;
mod search_input;

pub use category_picker::{CategoryPicker, PickerEvent};
pub use edit_form::{EditForm, FormEvent};
pub use search_input::{SearchEvent, SearchInput};

/// What a component did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do
  Handled,
  /// Consumed, and the parent should act on this event
  Event(T),
  /// Not consumed; the parent may handle it
  NotHandled,
}
