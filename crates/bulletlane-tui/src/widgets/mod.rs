mod bullet_field;
mod status_bar;

pub use bullet_field::{visible_slice, BulletFieldWidget};
pub use status_bar::StatusBarWidget;
