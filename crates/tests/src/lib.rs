//! # Integration Tests
//!
//! Cross-crate scenario tests.
//!
//! Covers:
//! - Sensor lifecycle over scripted and simulated feeds
//! - Staleness behaviour under simulated time
//! - Configuration -> sensor wiring

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ReadOptions::capture();
        assert_eq!(contracts::MOVEMENT_SENSOR_MODEL.to_string(), "erh:viamgpsd:gps");
    }
}

#[cfg(test)]
mod scenario_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeDelta, TimeZone, Utc};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        GeoPoint, ManualClock, MovementSensor, ReadOptions, SensorConfig, SensorError, TpvReport,
    };
    use feed::{
        FeedController, ScriptedConfig, ScriptedConnector, SimulatedConfig, SimulatedConnector,
    };
    use gps_sensor::GpsSensor;

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        ))
    }

    /// Poll until the sensor has ingested at least `n` reports
    async fn wait_for_ingested(sensor: &GpsSensor, n: u64) {
        for _ in 0..400 {
            if sensor.stats().reports_ingested >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("sensor ingested {} of {n} reports", sensor.stats().reports_ingested);
    }

    async fn scripted_sensor(clock: Arc<ManualClock>) -> (GpsSensor, FeedController) {
        let connector = ScriptedConnector::new();
        let controller = connector.controller();
        let sensor = GpsSensor::with_clock(&SensorConfig::new("gps"), &connector, clock)
            .await
            .unwrap();
        (sensor, controller)
    }

    /// construct -> deliver report -> position within a minute is fresh
    #[tokio::test]
    async fn test_fresh_position_after_delivery() {
        let clock = manual_clock();
        let (sensor, controller) = scripted_sensor(clock.clone()).await;

        assert!(controller.deliver(TpvReport::new(37.0, -122.0, 10.0, 2.5, 90.0)));
        wait_for_ingested(&sensor, 1).await;
        clock.advance(TimeDelta::seconds(30));

        let position = sensor
            .position(&ReadOptions::default())
            .await
            .into_result()
            .unwrap();
        assert_eq!(position.point, GeoPoint::new(37.0, -122.0));
        assert_eq!(position.altitude, 10.0);
    }

    /// construct -> deliver one report -> 61 s of silence -> stale
    #[tokio::test]
    async fn test_silent_feed_goes_stale() {
        let clock = manual_clock();
        let (sensor, controller) = scripted_sensor(clock.clone()).await;

        controller.deliver(TpvReport::new(37.0, -122.0, 10.0, 2.5, 90.0));
        wait_for_ingested(&sensor, 1).await;
        let recorded = sensor.snapshot().last_update;
        assert!(recorded.is_some());

        clock.advance(TimeDelta::seconds(61));

        let direct = sensor.position(&ReadOptions::default()).await;
        assert_eq!(direct.value.point, GeoPoint::new(37.0, -122.0));
        match direct.error {
            Some(SensorError::StaleData { last_update, .. }) => assert_eq!(last_update, recorded),
            other => panic!("expected stale data error, got {other:?}"),
        }

        let captured = sensor.position(&ReadOptions::capture()).await;
        assert_eq!(captured.value.point, GeoPoint::new(37.0, -122.0));
        assert_eq!(captured.error, Some(SensorError::NoDataToCapture));

        // Capability flags stay set regardless of staleness
        let properties = sensor.properties(&ReadOptions::default()).await.unwrap();
        assert!(properties.position_supported);
        assert!(properties.compass_heading_supported);
        assert!(properties.linear_velocity_supported);
    }

    /// A new report after going stale makes reads fresh again
    #[tokio::test]
    async fn test_recovery_after_new_report() {
        let clock = manual_clock();
        let (sensor, controller) = scripted_sensor(clock.clone()).await;

        controller.deliver(TpvReport::new(1.0, 1.0, 1.0, 1.0, 1.0));
        wait_for_ingested(&sensor, 1).await;
        clock.advance(TimeDelta::minutes(5));
        assert!(!sensor.compass_heading(&ReadOptions::default()).await.is_fresh());

        controller.deliver(TpvReport::new(2.0, 2.0, 2.0, 2.0, 180.0));
        wait_for_ingested(&sensor, 2).await;

        let heading = sensor.compass_heading(&ReadOptions::default()).await;
        assert_eq!(heading, contracts::Reading::fresh(180.0));
    }

    /// Unreachable feed -> ConnectionError, no instance
    #[tokio::test]
    async fn test_unreachable_feed() {
        let connector = SimulatedConnector::new(SimulatedConfig {
            unreachable: vec!["gpsd.invalid:2947".to_string()],
            ..Default::default()
        });
        let config = SensorConfig {
            feed_address: "gpsd.invalid:2947".to_string(),
            ..SensorConfig::new("gps")
        };

        match GpsSensor::new(&config, &connector).await {
            Err(SensorError::Connection { address, .. }) => {
                assert_eq!(address, "gpsd.invalid:2947")
            }
            Err(other) => panic!("expected connection error, got {other}"),
            Ok(_) => panic!("sensor constructed against an unreachable feed"),
        }
    }

    /// close -> reads still answer from the aging cache
    #[tokio::test]
    async fn test_reads_after_close() {
        let clock = manual_clock();
        let (sensor, controller) = scripted_sensor(clock.clone()).await;

        controller.deliver(TpvReport::new(37.0, -122.0, 10.0, 2.5, 90.0));
        wait_for_ingested(&sensor, 1).await;
        sensor.close().await.unwrap();

        let readings = sensor.readings(&ReadOptions::default()).await.unwrap();
        assert_eq!(readings.compass, 90.0);

        clock.advance(TimeDelta::seconds(61));
        let velocity = sensor.linear_velocity(&ReadOptions::default()).await;
        assert_eq!(velocity.value.y, 2.5);
        assert!(velocity.error.as_ref().is_some_and(SensorError::is_stale));

        // Unsupported reads are unaffected
        assert!(sensor.orientation(&ReadOptions::default()).await.is_fresh());
        assert_eq!(sensor.accuracy(&ReadOptions::default()).await, Ok(None));
    }

    /// Close failure surfaces as ShutdownError
    #[tokio::test]
    async fn test_close_failure() {
        let connector = ScriptedConnector::with_config(ScriptedConfig {
            fail_close: true,
            ..Default::default()
        });
        let sensor = GpsSensor::new(&SensorConfig::new("gps"), &connector)
            .await
            .unwrap();

        let err = sensor.close().await.unwrap_err();
        assert!(matches!(err, SensorError::Shutdown { .. }));
    }

    /// Simulated feed keeps the cache fresh against the system clock
    #[tokio::test]
    async fn test_simulated_feed_end_to_end() {
        let connector = SimulatedConnector::new(SimulatedConfig {
            frequency_hz: 100.0,
            ..Default::default()
        });
        let sensor = GpsSensor::new(&SensorConfig::new("sim"), &connector)
            .await
            .unwrap();

        wait_for_ingested(&sensor, 3).await;

        let readings = sensor.readings(&ReadOptions::capture()).await.unwrap();
        assert!((readings.position.lat - 37.0).abs() < 0.01);
        assert!(readings.position.lon > -122.0);
        assert_eq!(readings.compass, 90.0);
        assert_eq!(readings.linear_velocity.y, 2.5);

        sensor.close().await.unwrap();
        let ingested = sensor.stats().reports_ingested;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sensor.stats().reports_ingested, ingested);
    }

    /// Loaded configuration drives the staleness threshold
    #[tokio::test]
    async fn test_config_threshold_applies() {
        let config = ConfigLoader::load_from_str(
            "name = \"gps\"\nstale_after_secs = 10\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        let clock = manual_clock();
        let connector = ScriptedConnector::new();
        let controller = connector.controller();
        let sensor = GpsSensor::with_clock(&config, &connector, clock.clone())
            .await
            .unwrap();

        controller.deliver(TpvReport::new(1.0, 2.0, 3.0, 4.0, 5.0));
        wait_for_ingested(&sensor, 1).await;

        clock.advance(TimeDelta::seconds(9));
        assert!(sensor.position(&ReadOptions::default()).await.is_fresh());
        clock.advance(TimeDelta::seconds(2));
        assert!(!sensor.position(&ReadOptions::default()).await.is_fresh());
    }

    /// Concurrent readers racing the feed always see whole reports
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_are_consistent() {
        let (sensor, controller) = scripted_sensor(manual_clock()).await;
        let sensor = Arc::new(sensor);

        let writer = std::thread::spawn(move || {
            for i in 1..=500 {
                let v = i as f64;
                controller.deliver(TpvReport::new(v, v, v, v, v));
            }
        });

        let mut readers = Vec::new();
        for _ in 0..4 {
            let sensor = sensor.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    let snapshot = sensor.snapshot();
                    let r = snapshot.report;
                    assert_eq!(r.lat, r.lon);
                    assert_eq!(r.lat, r.alt);
                    assert_eq!(r.lat, r.speed);
                    assert_eq!(r.lat, r.track);
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.join().unwrap();
        for reader in readers {
            reader.await.unwrap();
        }

        // Whatever was skipped under load, the last delivery wins
        for _ in 0..400 {
            if sensor.snapshot().report.lat == 500.0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(sensor.snapshot().report.lat, 500.0);
    }
}
