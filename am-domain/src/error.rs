use crate::{CityId, ResourceId, ServerId, TierId};

/// Caller supplied input outside of the valid domain. Missing prices are never an error,
/// calculators report them as `None`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown city: {0}")]
    UnknownCity(CityId),
    #[error("Unknown resource: {0}")]
    UnknownResource(ResourceId),
    #[error("Unknown tier: {0}")]
    UnknownTier(TierId),
    #[error("Unknown market server: {0}")]
    UnknownServer(ServerId),
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("Station fee must be a percentage between 0 and 100, got {0}")]
    InvalidStationFee(f64),
    #[error("Return rate must be a percentage in [0, 100), got {0}")]
    InvalidReturnRate(f64),
    #[error("Amount exceeds the representable range")]
    AmountOverflow,
}

pub fn validate_quantity(quantity: u32) -> Result<u32, EngineError> {
    if quantity == 0 {
        return Err(EngineError::InvalidQuantity);
    }
    Ok(quantity)
}

pub fn validate_station_fee(station_fee_percent: f64) -> Result<f64, EngineError> {
    if !station_fee_percent.is_finite() || !(0.0..=100.0).contains(&station_fee_percent) {
        return Err(EngineError::InvalidStationFee(station_fee_percent));
    }
    Ok(station_fee_percent)
}

pub fn validate_return_rate(return_rate_percent: f64) -> Result<f64, EngineError> {
    if !return_rate_percent.is_finite() || !(0.0..100.0).contains(&return_rate_percent) {
        return Err(EngineError::InvalidReturnRate(return_rate_percent));
    }
    Ok(return_rate_percent)
}

/// Clamps a user typed quantity to at least 1.
pub fn clamp_quantity(input: i64) -> u32 {
    input.clamp(1, u32::MAX as i64) as u32
}

/// Clamps a user typed station fee into [0, 100]. Unparsable input (NaN) counts as 0.
pub fn clamp_station_fee(input: f64) -> f64 {
    if input.is_nan() {
        0.0
    } else {
        input.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_keeps_user_input_in_range() {
        assert_eq!(clamp_quantity(-5), 1);
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(250), 250);
        assert_eq!(clamp_quantity(i64::MAX), u32::MAX);

        assert_eq!(clamp_station_fee(-3.0), 0.0);
        assert_eq!(clamp_station_fee(12.5), 12.5);
        assert_eq!(clamp_station_fee(250.0), 100.0);
        assert_eq!(clamp_station_fee(f64::NAN), 0.0);
        assert_eq!(clamp_station_fee(f64::INFINITY), 100.0);
    }

    #[test]
    fn validation_rejects_out_of_domain_values() {
        assert_eq!(validate_quantity(0), Err(EngineError::InvalidQuantity));
        assert_eq!(validate_quantity(1), Ok(1));

        assert_eq!(validate_station_fee(0.0), Ok(0.0));
        assert_eq!(validate_station_fee(100.0), Ok(100.0));
        assert_eq!(validate_station_fee(100.5), Err(EngineError::InvalidStationFee(100.5)));
        assert!(validate_station_fee(f64::NAN).is_err());

        assert_eq!(validate_return_rate(53.0), Ok(53.0));
        assert_eq!(validate_return_rate(100.0), Err(EngineError::InvalidReturnRate(100.0)));
        assert!(validate_return_rate(-1.0).is_err());
    }
}
