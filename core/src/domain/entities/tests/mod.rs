mod fraud_alert_tests;
