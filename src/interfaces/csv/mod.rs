pub mod quotation_reader;
pub mod report_writer;
