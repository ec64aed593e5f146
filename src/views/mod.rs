//! Built-in views: Element, Text, Button, TextField, ForEach, NavigationStack,
//! NavigationLink, TabView.

pub mod button;
pub mod element;
pub mod for_each;
pub mod navigation;
pub mod tabs;
pub mod text;
pub mod text_field;

pub use button::Button;
pub use element::Element;
pub use for_each::ForEach;
pub use navigation::{DestinationFn, NavigationLink, NavigationStack};
pub use tabs::TabView;
pub use text::Text;
pub use text_field::TextField;
