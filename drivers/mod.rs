// Driver package / 驱动包
pub mod dropbox;
