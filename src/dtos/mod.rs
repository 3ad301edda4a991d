pub mod propertydtos;
pub mod searchdtos;
