//! Static GHL lookup tables: custom field ids and sales pipelines.
//!
//! These ids identify objects inside the clinic's GHL location and are fixed
//! per deployment, so they live here as compile-time tables rather than
//! computed values.

/// Custom field ids for the eight attribution keys, in canonical key order.
pub const UTM_FIELD_IDS: [(&str, &str); 8] = [
    ("utm_source", "VKL9yoOF9lTSZtHZMO5U"),
    ("utm_medium", "pxwD2EAr1GSgyLiYpU5Q"),
    ("utm_campaign", "HUETkqNO3Rb85ipAurz5"),
    ("utm_term", "fK6TCMenKNLm4IU0RATu"),
    ("utm_content", "zfEQ4CFlj6DtMGAUpEtd"),
    ("gclid", "RUHIYD1KlESUrr0S0SAr"),
    ("fclid", "vyWxzt3TMcupLFCNInok"),
    ("dclid", "zkr9ysbxCNssVHQZkXah"),
];

/// Custom field id for the convenio (insurance agreement) value.
pub const CONVENIO_FIELD_ID: &str = "YwpfSc45qvZaCpyxEHfV";

/// A sales pipeline and its entry stage ("Nuevo Prospecto").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    pub pipeline_id: &'static str,
    pub stage_id: &'static str,
}

/// Pipelines keyed by normalized specialty name. Exactly two specialties
/// route to a pipeline; any other service value creates no opportunity.
const PIPELINES: [(&str, Pipeline); 2] = [
    (
        "Oftalmologia",
        Pipeline {
            pipeline_id: "riX47hFaMmDPNs26tqLQ",
            stage_id: "e87c232f-9269-46e7-b6d9-de86dd8ea645",
        },
    ),
    (
        "Otorrinolaringologia",
        Pipeline {
            pipeline_id: "gcrEQ3VoaS2mQdCclIUL",
            stage_id: "917fbca5-21a3-4289-bb1c-a30fd16437b7",
        },
    ),
];

/// Normalizes a submitted service name to the pipeline key form:
/// first character upper-cased, remainder lower-cased.
pub fn normalize_specialty(service: &str) -> String {
    let mut chars = service.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Looks up the pipeline for a submitted service value, normalizing first.
pub fn pipeline_for(service: &str) -> Option<Pipeline> {
    let normalized = normalize_specialty(service);
    PIPELINES
        .iter()
        .find(|(key, _)| *key == normalized)
        .map(|(_, pipeline)| *pipeline)
}
