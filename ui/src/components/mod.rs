pub mod app;
pub mod coffee_form;
pub mod injected;
pub mod memo_list;
pub mod ui_state;
pub mod wallet_info;
