//! 配置校验模块
//!
//! 校验规则：
//! - 至少一个 series
//! - series 名称非空且唯一
//! - flush_interval > 0
//! - sample_interval > 0
//! - queue_capacity > 0

use std::collections::HashSet;

use contracts::{ContractError, StreamerConfig};

/// 校验 StreamerConfig
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &StreamerConfig) -> Result<(), ContractError> {
    validate_server(config)?;
    validate_series(config)?;
    Ok(())
}

fn validate_server(config: &StreamerConfig) -> Result<(), ContractError> {
    let server = &config.server;

    if server.flush_interval.is_zero() {
        return Err(ContractError::config_validation(
            "server.flush_interval",
            "flush_interval must be > 0",
        ));
    }

    if server.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "server.queue_capacity",
            "queue_capacity must be > 0",
        ));
    }

    if server.listen.trim().is_empty() {
        return Err(ContractError::config_validation(
            "server.listen",
            "listen address cannot be empty",
        ));
    }

    Ok(())
}

/// 校验 series 列表
fn validate_series(config: &StreamerConfig) -> Result<(), ContractError> {
    if config.series.is_empty() {
        return Err(ContractError::config_validation(
            "series",
            "at least one series is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, series) in config.series.iter().enumerate() {
        if series.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("series[{idx}].name"),
                "series name cannot be empty",
            ));
        }

        if !seen.insert(series.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("series[name={}]", series.name),
                "duplicate series name",
            ));
        }

        if series.sample_interval.is_zero() {
            return Err(ContractError::config_validation(
                format!("series[{}].sample_interval", series.name),
                "sample_interval must be > 0",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SeriesConfig, Waveform};
    use std::time::Duration;

    fn field_of(err: ContractError) -> String {
        match err {
            ContractError::ConfigValidation { field, .. } => field,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(validate(&StreamerConfig::default()).is_ok());
    }

    #[test]
    fn test_no_series() {
        let mut config = StreamerConfig::default();
        config.series.clear();
        assert_eq!(field_of(validate(&config).unwrap_err()), "series");
    }

    #[test]
    fn test_empty_name() {
        let mut config = StreamerConfig::default();
        config.series.push(SeriesConfig::new("", Waveform::Sine));
        assert_eq!(field_of(validate(&config).unwrap_err()), "series[3].name");
    }

    #[test]
    fn test_duplicate_name() {
        let mut config = StreamerConfig::default();
        config.series.push(SeriesConfig::new("b", Waveform::Sine));
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate series name"));
    }

    #[test]
    fn test_zero_intervals() {
        let mut config = StreamerConfig::default();
        config.server.flush_interval = Duration::ZERO;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "server.flush_interval"
        );

        let mut config = StreamerConfig::default();
        config.series[0].sample_interval = Duration::ZERO;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "series[a].sample_interval"
        );
    }

    #[test]
    fn test_zero_capacity() {
        let mut config = StreamerConfig::default();
        config.server.queue_capacity = 0;
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "server.queue_capacity"
        );
    }
}
