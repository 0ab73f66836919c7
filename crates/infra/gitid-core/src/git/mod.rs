pub mod utils;

pub use utils::{ORIGIN, get_remote_url, is_inside_work_tree, set_remote_url};
