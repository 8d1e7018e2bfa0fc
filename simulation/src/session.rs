use crate::parameters::DriveParameters;

/// State owned by one interaction shell.
///
/// Holds the parameters of the most recent computation so the plot and
/// export actions can reuse them. Starts at the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    last: DriveParameters,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(params: DriveParameters) -> Self {
        Self { last: params }
    }

    /// Overwrite the remembered parameters.
    pub fn record(&mut self, params: DriveParameters) {
        log::debug!(
            "session parameters now mass={} energy density={}",
            params.mass,
            params.energy_density
        );
        self.last = params;
    }

    pub fn parameters(&self) -> DriveParameters {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_at_defaults() {
        assert_eq!(Session::new().parameters(), DriveParameters::default());
    }

    #[test]
    fn test_record_overwrites_last_parameters() {
        let mut session = Session::new();
        let first = DriveParameters::new(12.0, 40.0).unwrap();
        let second = DriveParameters::new(3.0, 7.5).unwrap();
        session.record(first);
        assert_eq!(session.parameters(), first);
        session.record(second);
        assert_eq!(session.parameters(), second);
    }
}
