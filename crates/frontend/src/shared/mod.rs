pub mod api_utils;
pub mod connectivity;
pub mod date_utils;
pub mod storage;
pub mod timer;
