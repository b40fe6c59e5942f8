//! Well-known namespace URIs found in process-model documents.

// =============================================================================
// Vendor extension namespaces
// =============================================================================

/// Camunda Platform 7 extension namespace.
pub const CAMUNDA: &str = "http://camunda.org/schema/1.0/bpmn";

/// Activiti extension namespace.
pub const ACTIVITI: &str = "http://activiti.org/bpmn";

// =============================================================================
// BPMN 2.0 namespaces
// =============================================================================

/// BPMN 2.0 semantic model namespace.
pub const BPMN_MODEL: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";

/// BPMN 2.0 diagram interchange namespace.
pub const BPMN_DI: &str = "http://www.omg.org/spec/BPMN/20100524/DI";

/// Conventional prefix for [`CAMUNDA`].
pub const CAMUNDA_PREFIX: &str = "camunda";

/// Conventional prefix for [`ACTIVITI`].
pub const ACTIVITI_PREFIX: &str = "activiti";
