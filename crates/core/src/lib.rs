mod command;
mod config;
mod error;
mod filter;
mod form;
mod schema;

pub use command::{build_command, InvocationMode, ToolCommand, ToolOutcome, ToolRunner};
pub use config::{parse_bool, LibrarianConfig, CONFIG_ENV, DEFAULT_CONFIG};
pub use error::{LibrarianError, Result};
pub use filter::{
    FilterDescriptor, FilterMode, Submission, SubmittedMode, EXACT_TEXT_MAX_LEN, NONE_SENTINEL,
    UPDATE_FIELD,
};
pub use form::{
    render_option, render_visibility, CategoryView, Diagnostics, FieldView, FormView,
    LibrarianPage, OptionView, PAGE_TITLE,
};
pub use schema::{Category, FieldRef, FieldSchema, VARIABLES_CATEGORY};
