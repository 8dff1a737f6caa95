pub mod csv_export;
pub mod refresh_tokens;
pub mod resignation_form;
