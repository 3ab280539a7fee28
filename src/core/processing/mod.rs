pub mod crop;
pub mod resize;
pub mod smooth;

pub use crop::{CropWindow, center_crop_window, crop_center};
pub use resize::{calculate_resize_dimensions, resize};
pub use smooth::smooth;
