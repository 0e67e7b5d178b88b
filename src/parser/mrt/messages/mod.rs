pub(crate) mod bgp4mp;
pub(crate) mod table_dump_message;
pub(crate) mod table_dump_v2_message;
