mod panels;

pub(super) use panels::{show_error, show_loading};
