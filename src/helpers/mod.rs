//! Helper functions used while rendering pages

mod date;
mod html;
mod reading;
mod url;

pub use self::date::*;
pub use self::html::*;
pub use self::reading::*;
pub use self::url::*;
