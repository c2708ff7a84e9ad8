//! Canonical training-schema field table
//!
//! The training schema is fixed by the bundle's domain: a medical-claims
//! record with demographic, diagnosis/procedure code, chronic-condition flag,
//! and reimbursement-amount fields. Normalization is driven entirely by this
//! table: each entry names the canonical field, the caller-facing aliases
//! accepted for it, and how its raw value is coerced. Divergent aliasing is a
//! data difference here, not a code difference.

/// How a canonical field's raw value is interpreted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Coerced to a finite number; `default` substituted when missing/empty
    Numeric { default: f64 },
    /// Passed through as text; `default` substituted when missing/empty
    Text { default: &'static str },
    /// Free text reduced to the first ICD-style token, else "Unknown"
    DiagnosisCode,
    /// Free text reduced to the first five-digit token, else "00000"
    ProcedureCode,
    /// No caller-facing input; always the literal value
    Fixed { value: &'static str },
}

/// One canonical field: name, accepted caller-facing aliases, coercion rule
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

/// Months of Part A/B coverage assumed when the claim does not say
const FULL_COVERAGE_MONTHS: f64 = 12.0;

/// The complete canonical field set. Every bundle for this domain selects a
/// subset of these names; normalization populates all of them.
pub static CANONICAL_FIELDS: &[FieldSpec] = &[
    // Reimbursement amounts
    FieldSpec {
        name: "InscClaimAmtReimbursed",
        aliases: &["claim_amount", "amount", "reimbursed_amount"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "DeductibleAmtPaid",
        aliases: &["deductible", "deductible_paid"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "IPAnnualReimbursementAmt",
        aliases: &["ip_annual_reimbursement"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "IPAnnualDeductibleAmt",
        aliases: &["ip_annual_deductible"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "OPAnnualReimbursementAmt",
        aliases: &["op_annual_reimbursement"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "OPAnnualDeductibleAmt",
        aliases: &["op_annual_deductible"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    // Demographics
    FieldSpec {
        name: "Gender",
        aliases: &["gender", "sex"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "Race",
        aliases: &["race"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "State",
        aliases: &["state"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "County",
        aliases: &["county"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    // Coverage months
    FieldSpec {
        name: "NoOfMonths_PartACov",
        aliases: &["months_part_a"],
        kind: FieldKind::Numeric {
            default: FULL_COVERAGE_MONTHS,
        },
    },
    FieldSpec {
        name: "NoOfMonths_PartBCov",
        aliases: &["months_part_b"],
        kind: FieldKind::Numeric {
            default: FULL_COVERAGE_MONTHS,
        },
    },
    // Chronic-condition flags
    FieldSpec {
        name: "RenalDiseaseIndicator",
        aliases: &["renal_disease"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_Alzheimer",
        aliases: &["chronic_alzheimer"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_Heartfailure",
        aliases: &["chronic_heart_failure"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_KidneyDisease",
        aliases: &["chronic_kidney_disease"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_Cancer",
        aliases: &["chronic_cancer"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_ObstrPulmonary",
        aliases: &["chronic_obstructive_pulmonary"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_Depression",
        aliases: &["chronic_depression"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_Diabetes",
        aliases: &["chronic_diabetes"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_IschemicHeart",
        aliases: &["chronic_ischemic_heart"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_Osteoporasis",
        aliases: &["chronic_osteoporosis"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_rheumatoidarthritis",
        aliases: &["chronic_rheumatoid_arthritis"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    FieldSpec {
        name: "ChronicCond_stroke",
        aliases: &["chronic_stroke"],
        kind: FieldKind::Numeric { default: 0.0 },
    },
    // Identity fields
    FieldSpec {
        name: "Provider",
        aliases: &["provider_id", "provider"],
        kind: FieldKind::Text { default: "Unknown" },
    },
    FieldSpec {
        name: "BeneID",
        aliases: &["beneficiary_id", "bene_id"],
        kind: FieldKind::Text { default: "Unknown" },
    },
    FieldSpec {
        name: "AttendingPhysician",
        aliases: &["attending_physician", "physician"],
        kind: FieldKind::Text { default: "Unknown" },
    },
    FieldSpec {
        name: "OperatingPhysician",
        aliases: &["operating_physician"],
        kind: FieldKind::Text { default: "Unknown" },
    },
    FieldSpec {
        name: "OtherPhysician",
        aliases: &["other_physician"],
        kind: FieldKind::Text { default: "Unknown" },
    },
    // Diagnosis codes: the primary code is extracted from free text, the
    // secondary slots have no caller-facing input
    FieldSpec {
        name: "ClmAdmitDiagnosisCode",
        aliases: &["admit_diagnosis"],
        kind: FieldKind::DiagnosisCode,
    },
    FieldSpec {
        name: "ClmDiagnosisCode_1",
        aliases: &["diagnosis", "diagnosis_text", "dx", "diagnosis_code"],
        kind: FieldKind::DiagnosisCode,
    },
    FieldSpec {
        name: "ClmDiagnosisCode_2",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmDiagnosisCode_3",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmDiagnosisCode_4",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmDiagnosisCode_5",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmDiagnosisCode_6",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmDiagnosisCode_7",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmDiagnosisCode_8",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmDiagnosisCode_9",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmDiagnosisCode_10",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    // Procedure codes: same shape, but the primary default is the no-procedure
    // sentinel the model was trained with
    FieldSpec {
        name: "ClmProcedureCode_1",
        aliases: &["procedure", "procedure_text", "cpt", "procedure_code"],
        kind: FieldKind::ProcedureCode,
    },
    FieldSpec {
        name: "ClmProcedureCode_2",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmProcedureCode_3",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmProcedureCode_4",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmProcedureCode_5",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
    FieldSpec {
        name: "ClmProcedureCode_6",
        aliases: &[],
        kind: FieldKind::Fixed { value: "Unknown" },
    },
];

/// Look up a canonical field spec by name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    CANONICAL_FIELDS.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_unique() {
        let mut seen = std::collections::HashSet::new();
        for spec in CANONICAL_FIELDS {
            assert!(seen.insert(spec.name), "duplicate field {}", spec.name);
        }
    }

    #[test]
    fn test_coverage_months_default() {
        let spec = field_spec("NoOfMonths_PartACov").unwrap();
        assert_eq!(spec.kind, FieldKind::Numeric { default: 12.0 });
    }

    #[test]
    fn test_provider_alias() {
        let spec = field_spec("Provider").unwrap();
        assert!(spec.aliases.contains(&"provider_id"));
    }

    #[test]
    fn test_secondary_codes_fixed() {
        for name in ["ClmDiagnosisCode_2", "ClmProcedureCode_6"] {
            let spec = field_spec(name).unwrap();
            assert_eq!(spec.kind, FieldKind::Fixed { value: "Unknown" });
        }
    }
}
