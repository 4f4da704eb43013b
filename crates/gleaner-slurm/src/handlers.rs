//! Field-name-to-handler dispatch for the structured accounting parser.
//!
//! The table below is the single place where the operators' field
//! mapping decisions live. Some of them are deliberate conventions
//! rather than discovered truths (the upstream "name" field is stored
//! as the job's command, for one), so they are data here, not logic
//! spread through the parser.

/// What to do with one named field of an accounting entry.
///
/// Closed set: a field name that maps to none of these is schema
/// drift and fails the whole report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldHandler {
    /// Keep the value under the same name.
    Copy,
    /// Keep the value under a different name.
    Rename(&'static str),
    /// Drop the field entirely.
    Ignore,
    /// Pull named sub-fields out of a sub-object, each under its own
    /// output name. Missing sub-fields become null.
    ExpandSubitems(&'static [(&'static str, &'static str)]),
    /// Join a sub-list's values with a separator into one string.
    JoinSubitems {
        separator: &'static str,
        output: &'static str,
    },
}

/// Handler table for job entries in the structured accounting report.
///
/// Every field the source schema can emit must appear here; an absent
/// name is fatal, because silently dropping an unknown field would
/// let schema drift corrupt downstream semantics undetected.
pub const JOB_FIELD_HANDLERS: &[(&str, FieldHandler)] = &[
    ("account", FieldHandler::Copy),
    ("allocation_nodes", FieldHandler::Rename("node_count")),
    (
        "array",
        FieldHandler::ExpandSubitems(&[
            ("job_id", "array_job_id"),
            ("task_id", "array_task_id"),
        ]),
    ),
    ("association", FieldHandler::Ignore),
    ("cluster", FieldHandler::Ignore),
    ("comment", FieldHandler::Ignore),
    ("container", FieldHandler::Ignore),
    ("derived_exit_code", FieldHandler::Ignore),
    (
        "exit_code",
        FieldHandler::ExpandSubitems(&[("return_code", "exit_code")]),
    ),
    (
        "flags",
        FieldHandler::JoinSubitems {
            separator: ",",
            output: "flags",
        },
    ),
    ("group", FieldHandler::Copy),
    ("het", FieldHandler::Ignore),
    ("job_id", FieldHandler::Copy),
    ("kill_request_user", FieldHandler::Ignore),
    ("mcs", FieldHandler::Ignore),
    // Convention inherited from the dashboard's operators: the
    // accounting "name" is what users recognize as the command.
    ("name", FieldHandler::Rename("command")),
    ("nodes", FieldHandler::Copy),
    ("partition", FieldHandler::Copy),
    ("priority", FieldHandler::Ignore),
    ("qos", FieldHandler::Copy),
    ("required", FieldHandler::Ignore),
    ("reservation", FieldHandler::Ignore),
    (
        "state",
        FieldHandler::ExpandSubitems(&[("current", "state"), ("reason", "state_reason")]),
    ),
    ("steps", FieldHandler::Ignore),
    (
        "time",
        FieldHandler::ExpandSubitems(&[
            ("submission", "submit_time"),
            ("start", "start_time"),
            ("end", "end_time"),
            ("eligible", "eligible_time"),
            ("limit", "time_limit"),
        ]),
    ),
    ("tres", FieldHandler::Copy),
    ("user", FieldHandler::Rename("username")),
    ("wckey", FieldHandler::Ignore),
    ("working_directory", FieldHandler::Copy),
];

/// Look up the handler for a field name.
pub fn job_field_handler(name: &str) -> Option<FieldHandler> {
    JOB_FIELD_HANDLERS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, handler)| *handler)
}
