#[cfg(test)]
mod tests {
    use crate::error::*;
    use std::io;

    #[test]
    fn test_internal_error_display() {
        let err = Error::internal("unknown function f");
        assert_eq!(
            err.to_string(),
            "Internal compiler error: unknown function f"
        );
        assert!(err.is_internal());
    }

    #[test]
    fn test_analysis_error_display() {
        let err = Error::Analysis("2 errors".to_string());
        assert_eq!(err.to_string(), "Analysis error: 2 errors");
        assert!(!err.is_internal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing.yul");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("IO error:"));
        assert!(err.to_string().contains("missing.yul"));
    }

    #[test]
    fn test_anyhow_is_transparent() {
        let err: Error = anyhow::anyhow!("custom failure").into();
        assert_eq!(err.to_string(), "custom failure");
    }

    fn guarded(value: usize) -> Result<usize> {
        crate::yul_assert!(value % 2 == 0, "odd value {}", value);
        Ok(value / 2)
    }

    #[test]
    fn test_yul_assert_passes_through() {
        assert_eq!(guarded(8).unwrap(), 4);
    }

    #[test]
    fn test_yul_assert_reports_invariant() {
        let err = guarded(3).unwrap_err();
        assert!(err.is_internal());
        assert_eq!(err.to_string(), "Internal compiler error: odd value 3");
    }

    #[test]
    fn test_yul_assert_into_anyhow() {
        fn run() -> anyhow::Result<()> {
            crate::yul_assert!(false, "always");
            Ok(())
        }
        let err = run().unwrap_err();
        let core = err.downcast_ref::<Error>().unwrap();
        assert!(core.is_internal());
    }
}
