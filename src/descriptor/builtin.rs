//! Descriptors compiled into the binary

/// `(name, json)` pairs loaded by [`super::DescriptorRegistry::with_builtins`]
pub const BUILTIN_DESCRIPTORS: &[(&str, &str)] = &[(
    "transmission",
    include_str!("../../descriptors/transmission.json"),
)];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ApiDescriptor, Authentication, ErrorKind};
    use crate::domain::{CommandKind, Status};

    #[test]
    fn test_builtins_parse_and_validate() {
        for (name, json) in BUILTIN_DESCRIPTORS {
            let descriptor = ApiDescriptor::from_json(name, json).unwrap();
            assert_eq!(descriptor.name, *name);
        }
    }

    #[test]
    fn test_transmission_contract() {
        let api = ApiDescriptor::from_json("transmission", BUILTIN_DESCRIPTORS[0].1).unwrap();

        assert!(matches!(
            api.authentication.first(),
            Some(Authentication::Token(scheme)) if scheme.header == "X-Transmission-Session-Id"
        ));
        assert_eq!(api.token_scheme_for(409).map(|s| s.missing_status), Some(409));
        assert_eq!(api.error_for(401), Some(ErrorKind::Password));

        for kind in CommandKind::ALL {
            assert_eq!(api.available(kind), kind != CommandKind::Pause, "{kind}");
        }

        assert_eq!(api.statuses.status_for("4"), Status::Downloading);
        assert_eq!(api.statuses.status_for("5"), Status::Queued);
        assert_eq!(api.statuses.status_for("6"), Status::Seeding);
        assert_eq!(api.statuses.status_for("9"), Status::Unknown);
    }
}
