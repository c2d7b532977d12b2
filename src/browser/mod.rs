pub mod lazy_images;
pub mod webdriver;

pub use lazy_images::{force_lazy_images, wait_for_images};
pub use webdriver::{DEFAULT_WEBDRIVER_URL, connect_to_webdriver, prepare_page};
