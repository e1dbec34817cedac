#[cfg(test)]
mod connection_tests {
    use nzkit::core::db::DisconnectOutcome;
    use nzkit::test_utils::{Call, Failure, Failures, MockDriver};
    use nzkit::{ConnectionManager, Console, Credentials};

    fn credentials() -> Credentials {
        Credentials::new("lab_user", "Tr0ub4dor", "nz.example.com", "LABDB", 5480)
    }

    #[test]
    fn test_open_success_returns_handle() {
        let manager = ConnectionManager::new(MockDriver::new());
        let mut console = Console::buffer();

        let conn = manager.open(&credentials(), &mut console);

        assert!(conn.is_some());
        assert_eq!(
            manager.driver().log().calls(),
            vec![Call::Connect("LABDB".to_string())]
        );
        assert_eq!(
            console.contents(),
            "Connection to database LABDB successful.\n\n"
        );
    }

    #[test]
    fn test_open_database_error_logs_all_credentials_when_revealed() {
        let driver = MockDriver::new().with_failures(Failures {
            connect: Some(Failure::Database("password authentication failed".to_string())),
            ..Failures::default()
        });
        let manager = ConnectionManager::new(driver).reveal_secrets(true);
        let mut console = Console::buffer();

        assert!(manager.open(&credentials(), &mut console).is_none());

        let output = console.contents();
        assert!(output.contains("Failed to connect to the database: LABDB"));
        assert!(output.contains("password authentication failed"));
        for field in ["nz.example.com", "5480", "lab_user", "Tr0ub4dor", "LABDB"] {
            assert!(output.contains(field), "missing {} in {}", field, output);
        }
    }

    #[test]
    fn test_open_generic_error_masks_password() {
        let driver = MockDriver::new().with_failures(Failures {
            connect: Some(Failure::Other("connection refused".to_string())),
            ..Failures::default()
        });
        let manager = ConnectionManager::new(driver);
        let mut console = Console::buffer();

        assert!(manager.open(&credentials(), &mut console).is_none());

        let output = console.contents();
        assert!(output.contains("Error: Connection error: connection refused"));
        assert!(output.contains("User     : lab_user"));
        assert!(output.contains("Password : ********"));
        assert!(!output.contains("Tr0ub4dor"));
    }

    #[test]
    fn test_close_calls_driver_once() {
        let manager = ConnectionManager::new(MockDriver::new());
        let mut console = Console::buffer();
        let mut conn = manager.open(&credentials(), &mut console).unwrap();

        let outcome = manager.close(Some(&mut conn), "LABDB", &mut console);

        assert_eq!(outcome, DisconnectOutcome::Disconnected);
        assert!(conn.is_closed());
        assert_eq!(manager.driver().log().count(&Call::Close), 1);
        assert!(console
            .contents()
            .contains("Successfully disconnected from the database LABDB."));
    }

    #[test]
    fn test_close_none_does_nothing() {
        let manager = ConnectionManager::new(MockDriver::new());
        let mut console = Console::buffer();

        let outcome = manager.close(None, "LABDB", &mut console);

        assert_eq!(outcome, DisconnectOutcome::NotConnected);
        assert!(manager.driver().log().calls().is_empty());
        assert!(console.contents().is_empty());
    }

    #[test]
    fn test_close_twice_logs_failure() {
        let manager = ConnectionManager::new(MockDriver::new());
        let mut console = Console::buffer();
        let mut conn = manager.open(&credentials(), &mut console).unwrap();

        manager.close(Some(&mut conn), "LABDB", &mut console);
        let second = manager.close(Some(&mut conn), "LABDB", &mut console);

        assert!(matches!(second, DisconnectOutcome::Failed(_)));
        assert!(console
            .contents()
            .contains("Error: Failed to disconnect from the database LABDB."));
    }

    #[test]
    fn test_close_error_forces_one_retry() {
        let driver = MockDriver::new().with_failures(Failures {
            close: Some(Failure::Other("socket error".to_string())),
            ..Failures::default()
        });
        let manager = ConnectionManager::new(driver);
        let mut console = Console::buffer();
        let mut conn = manager.driver().connection();

        let outcome = manager.close(Some(&mut conn), "LABDB", &mut console);

        assert!(matches!(outcome, DisconnectOutcome::Failed(_)));
        assert_eq!(manager.driver().log().count(&Call::Close), 2);
        assert!(console
            .contents()
            .contains("Error details: Connection error: socket error"));
    }
}
