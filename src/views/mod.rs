pub mod ticket_detail;
pub mod ticket_list;
