pub mod group_select;
pub mod route_table;
pub mod toast;
