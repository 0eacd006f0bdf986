// Fixed user-facing answers. These are the only strings the pipeline ever
// shows for missing data, refusals, and degraded collaborators.

/// STRUCTURED path produced no rows (or no query was possible).
pub const NO_DATA_FOUND: &str = "No relevant employee data was found in the database.";

/// DOCUMENT path produced no policy passages.
pub const NO_POLICY_FOUND: &str =
    "I couldn't find any relevant policy information to answer your question.";

/// HYBRID path produced neither rows nor passages.
pub const NOTHING_FOUND: &str =
    "I couldn't find any relevant database or policy information to answer your question.";

/// The access evaluator denied the structured request.
pub const NOT_AUTHORIZED: &str = "You are not authorized to access this information.";

/// Text generation is unavailable; the fully degraded answer.
pub const MODEL_UNAVAILABLE: &str = "The AI model is currently unavailable. Please try again later.";

/// The structured-data backend could not be reached.
pub const DATA_UNAVAILABLE: &str =
    "I couldn't reach the employee records right now. Please try again later.";

/// The policy library could not be reached.
pub const DOCUMENTS_UNAVAILABLE: &str =
    "The policy library is unavailable right now. Please try again later.";

/// The generator produced something the pipeline could not safely use.
pub const MALFORMED_OUTPUT: &str =
    "I couldn't work out how to look that up. Please try rephrasing your question.";

/// Stand-in for a missing side of a HYBRID composition.
pub const POLICY_UNAVAILABLE_NOTE: &str = "Policy information was unavailable.";

/// Stand-in for a missing structured side of a HYBRID composition.
pub const DATA_UNAVAILABLE_NOTE: &str = "No employee data was available.";

/// Stand-in for a denied structured side of a HYBRID composition.
pub const DATA_NOT_AUTHORIZED_NOTE: &str =
    "The user is not authorized to view the requested employee data.";

/// Label the assistant uses for itself in prompts.
pub const ASSISTANT_PERSONA: &str =
    "You are Employee Self Service Bot, a helpful and professional HR assistant.";
