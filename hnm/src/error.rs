use anyhow::Error;
use hnmapped::prelude::HnMappedError;

/// Process exit code for an error: 3 when the month has no data,
/// 2 for invalid input, 1 for anything else.
pub fn exit_code(err: &Error) -> u8 {
    match err.downcast_ref::<HnMappedError>() {
        Some(HnMappedError::NoData { .. }) => 3,
        Some(
            HnMappedError::InvalidMonth { .. }
            | HnMappedError::UnknownFilterKey { .. }
            | HnMappedError::InvalidFilter { .. },
        ) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let no_data = Error::new(HnMappedError::NoData {
            month: "2014-03".into(),
        });
        assert_eq!(exit_code(&no_data), 3);

        let bad_key = Error::new(HnMappedError::UnknownFilterKey { key: "x".into() });
        assert_eq!(exit_code(&bad_key.context("parsing filters")), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("disk full")), 1);
    }
}
