use std::path::PathBuf;

use super::*;
use crate::error::ErrorCode;

#[test]
fn error_codes_are_stable() {
    let missing = ExportError::MissingOutput(PathBuf::from("/tmp/x/dist"));
    assert_eq!(missing.error_code(), "E_EXPORT_MISSING_OUTPUT");

    let failed = ExportError::StepFailed { step: BuildStep::Install, status: "exit status: 1".into(), output: String::new() };
    assert_eq!(failed.error_code(), "E_EXPORT_STEP_FAILED");

    let timeout = ExportError::Timeout { step: BuildStep::Build, after: Duration::from_secs(600) };
    assert_eq!(timeout.error_code(), "E_EXPORT_TIMEOUT");
}

#[test]
fn step_failure_message_includes_output() {
    let err = ExportError::StepFailed {
        step: BuildStep::Build,
        status: "exit status: 2".into(),
        output: "src/App.tsx(3,1): error TS1005".into(),
    };
    let text = err.to_string();
    assert!(text.starts_with("`npm run build` failed (exit status: 2)"));
    assert!(text.contains("error TS1005"));
}
