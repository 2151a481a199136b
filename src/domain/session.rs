//! Device Session
//!
//! Drives one camera/interface pair through the stage pipeline:
//!
//! ```text
//! [ProbeExisting] -> AwaitAdvertising -> ActivateWifi -> SettleWifiStart
//!   -> PrepareInterface -> Associate -> AcquireAddress -> InstallRoute
//!   -> VerifyReachable -> Connected
//! ```
//!
//! Every gating stage that fails ends the session as Failed. A stage never
//! runs before the previous one succeeded, and the session never goes back.

use crate::domain::addressing::fallback_address;
use crate::domain::error::StageFailure;
use crate::domain::events::{EventSender, MessageSeverity, Reporter};
use crate::domain::executor::{StageExecutor, StageRun};
use crate::domain::models::{DeviceSpec, SessionOutcome, SessionStatus, Stage, StageResult};
use crate::domain::settings::ConnectionSettings;
use crate::domain::transport::{TransportError, TransportResult, Transports, WifiNetwork};
use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Marker for a session that reached the Failed state
#[derive(Debug)]
struct Halted;

pub struct DeviceSession {
    device: Arc<DeviceSpec>,
    transports: Transports,
    settings: Arc<ConnectionSettings>,
    reporter: Reporter,
    deadline: Option<Instant>,
    history: Vec<StageResult>,
    address: Option<Ipv4Addr>,
}

impl DeviceSession {
    pub fn new(
        device: Arc<DeviceSpec>,
        transports: Transports,
        settings: Arc<ConnectionSettings>,
        event_sender: EventSender,
        deadline: Option<Instant>,
    ) -> Self {
        let reporter = Reporter::new(device.name.clone(), event_sender);
        Self {
            device,
            transports,
            settings,
            reporter,
            deadline,
            history: Vec::new(),
            address: None,
        }
    }

    /// Run the pipeline to a terminal state
    pub async fn run(mut self) -> SessionOutcome {
        info!(
            "[{}] Starting session on {} (ssid {})",
            self.device.name, self.device.interface, self.device.ssid
        );

        let status = match self.drive().await {
            Ok(()) => SessionStatus::Connected,
            Err(Halted) => SessionStatus::Failed,
        };

        match status {
            SessionStatus::Connected => info!("[{}] Connected", self.device.name),
            SessionStatus::Failed => error!("[{}] Session failed", self.device.name),
        }
        self.reporter.session_finished(status);

        SessionOutcome::new(self.device, status, self.history, self.address)
    }

    async fn drive(&mut self) -> Result<(), Halted> {
        if self.settings.skip_if_reachable && self.probe_existing().await? {
            return Ok(());
        }

        self.wait(Stage::AwaitAdvertising, self.settings.advertising_settle())
            .await?;
        self.activate_wifi().await?;
        self.wait(Stage::SettleWifiStart, self.settings.wifi_start_settle())
            .await?;
        self.prepare_interface().await?;
        self.associate().await?;
        self.acquire_address().await?;
        self.install_route().await?;
        self.verify_reachable().await
    }

    /// Short status probe; `true` when the camera already answers
    async fn probe_existing(&mut self) -> Result<bool, Halted> {
        let stage = Stage::ProbeExisting;
        self.reporter.stage_started(stage);

        let timeout = self.settings.existing_probe_timeout();
        let url = self.device.status_url(&self.settings.status_path);
        let http = self.transports.http.as_ref();
        let interface = self.device.interface.as_str();
        let probe = within(
            self.deadline,
            bounded(timeout, http.probe(interface, &url, timeout)),
        )
        .await;

        match probe {
            None => self.timed_out(stage),
            Some(Ok(200)) => {
                self.record(StageResult::success(stage, "already reachable (HTTP 200)", 1));
                Ok(true)
            }
            Some(Ok(code)) => {
                self.record(StageResult::retryable(
                    stage,
                    format!("not reachable yet (HTTP {})", code),
                    1,
                ));
                Ok(false)
            }
            Some(Err(e)) => {
                self.record(StageResult::retryable(
                    stage,
                    format!("not reachable yet ({})", e),
                    1,
                ));
                Ok(false)
            }
        }
    }

    async fn wait(&mut self, stage: Stage, delay: Duration) -> Result<(), Halted> {
        self.reporter.stage_started(stage);
        match within(self.deadline, tokio::time::sleep(delay)).await {
            Some(()) => {
                self.record(StageResult::success(stage, format!("waited {:?}", delay), 0));
                Ok(())
            }
            None => self.timed_out(stage),
        }
    }

    async fn activate_wifi(&mut self) -> Result<(), Halted> {
        let stage = Stage::ActivateWifi;
        self.reporter.stage_started(stage);

        // Held across every attempt and reset; queueing for it sits outside
        // the attempt timeouts
        let radio = Arc::clone(&self.transports.radio);
        let _radio = match within(self.deadline, radio.lock()).await {
            Some(guard) => guard,
            None => return self.timed_out(stage),
        };

        let run = {
            let executor =
                StageExecutor::new(stage, &self.settings.policies.activate_wifi, &self.reporter);
            let ble = self.transports.ble.as_ref();
            let address = self.device.ble_address.as_str();
            let reporter = &self.reporter;

            within(
                self.deadline,
                executor.execute_with(
                    move |_| async move { ble.activate_wifi(address).await.map_err(StageFailure::from) },
                    move || async move {
                        reporter.log(
                            "Resetting Bluetooth adapter before retry",
                            MessageSeverity::Warning,
                        );
                        if let Err(e) = ble.reset_radio().await {
                            warn!("Bluetooth adapter reset failed: {}", e);
                        }
                    },
                ),
            )
            .await
        };

        self.gate(stage, run)
    }

    async fn prepare_interface(&mut self) -> Result<(), Halted> {
        let stage = Stage::PrepareInterface;
        self.reporter.stage_started(stage);

        let run = {
            let executor = StageExecutor::new(
                stage,
                &self.settings.policies.prepare_interface,
                &self.reporter,
            );
            let network = self.transports.network.as_ref();
            let interface = self.device.interface.as_str();

            within(
                self.deadline,
                executor.execute(move |_| async move {
                    network
                        .reset_interface(interface)
                        .await
                        .map_err(StageFailure::from)
                }),
            )
            .await
        };

        self.gate(stage, run)
    }

    async fn associate(&mut self) -> Result<(), Halted> {
        let stage = Stage::Associate;
        self.reporter.stage_started(stage);

        let run = {
            let executor =
                StageExecutor::new(stage, &self.settings.policies.associate, &self.reporter);
            let network = self.transports.network.as_ref();
            let interface = self.device.interface.as_str();
            let wifi = WifiNetwork {
                ssid: &self.device.ssid,
                psk: &self.device.psk,
            };
            let config_path = self.device.credential_path();
            let config_path = config_path.as_path();

            within(
                self.deadline,
                executor.execute(move |_| async move {
                    network
                        .associate(interface, wifi, config_path)
                        .await
                        .map_err(StageFailure::from)
                }),
            )
            .await
        };

        self.gate(stage, run)
    }

    /// One lease request; any lease failure switches to the static fallback
    /// instead of asking again
    async fn acquire_address(&mut self) -> Result<(), Halted> {
        let stage = Stage::AcquireAddress;
        self.reporter.stage_started(stage);

        let network = Arc::clone(&self.transports.network);
        let interface = self.device.interface.clone();
        let lease_timeout = self.settings.lease_timeout();

        let lease = within(
            self.deadline,
            bounded(lease_timeout, network.acquire_lease(&interface, lease_timeout)),
        )
        .await;

        let lease_error = match lease {
            None => return self.timed_out(stage),
            Some(Ok(address)) => {
                self.address = Some(address);
                self.record(StageResult::success(stage, format!("leased {}", address), 1));
                return Ok(());
            }
            Some(Err(e)) => e,
        };

        let address = self.device.static_address.unwrap_or_else(|| {
            fallback_address(
                &interface,
                self.device.device_address,
                &self.settings.addressing,
            )
        });
        let prefix_len = self.settings.addressing.prefix_len;
        warn!(
            "[{}] Lease on {} failed ({}), assigning static {}/{}",
            self.device.name, interface, lease_error, address, prefix_len
        );
        self.reporter.log(
            format!("Lease failed ({}), using static {}", lease_error, address),
            MessageSeverity::Warning,
        );

        let assign_timeout = self.settings.static_assign_timeout();
        let assigned = within(
            self.deadline,
            bounded(
                assign_timeout,
                network.assign_static(&interface, address, prefix_len),
            ),
        )
        .await;

        match assigned {
            None => self.timed_out(stage),
            Some(Ok(())) => {
                self.address = Some(address);
                self.record(StageResult::success(
                    stage,
                    format!(
                        "lease failed ({}); assigned static {}/{}",
                        lease_error, address, prefix_len
                    ),
                    2,
                ));
                Ok(())
            }
            Some(Err(e)) => {
                self.record(StageResult::fatal(
                    stage,
                    format!(
                        "lease failed ({}); static assignment of {} failed: {}",
                        lease_error, address, e
                    ),
                    2,
                ));
                Err(Halted)
            }
        }
    }

    /// Best effort: a failed route is recorded but the session carries on
    async fn install_route(&mut self) -> Result<(), Halted> {
        let stage = Stage::InstallRoute;
        self.reporter.stage_started(stage);

        let run = {
            let executor =
                StageExecutor::new(stage, &self.settings.policies.install_route, &self.reporter);
            let network = self.transports.network.as_ref();
            let interface = self.device.interface.as_str();
            let destination = self.device.device_address;

            within(
                self.deadline,
                executor.execute(move |_| async move {
                    network
                        .install_route(interface, destination)
                        .await
                        .map_err(StageFailure::from)
                }),
            )
            .await
        };

        match run {
            None => self.timed_out(stage),
            Some(StageRun { result, .. }) if result.is_success() => {
                self.record(result);
                Ok(())
            }
            Some(StageRun { result, .. }) => {
                self.reporter.log(
                    "Route not installed, relying on default routing",
                    MessageSeverity::Warning,
                );
                self.record(StageResult::retryable(
                    stage,
                    format!("continuing without route: {}", result.detail),
                    result.attempts,
                ));
                Ok(())
            }
        }
    }

    async fn verify_reachable(&mut self) -> Result<(), Halted> {
        let stage = Stage::VerifyReachable;
        self.reporter.stage_started(stage);

        let run = {
            let policy = &self.settings.policies.verify_reachable;
            let executor = StageExecutor::new(stage, policy, &self.reporter);
            let http = self.transports.http.as_ref();
            let interface = self.device.interface.as_str();
            let url = self.device.status_url(&self.settings.status_path);
            let url = url.as_str();

            within(
                self.deadline,
                executor.execute(move |timeout| async move {
                    match http.probe(interface, url, timeout).await {
                        Ok(200) => Ok(()),
                        Ok(code) => Err(StageFailure::Recoverable(format!("HTTP {}", code))),
                        Err(e) => Err(StageFailure::from(e)),
                    }
                }),
            )
            .await
        };

        self.gate(stage, run)
    }

    fn gate(&mut self, stage: Stage, run: Option<StageRun<()>>) -> Result<(), Halted> {
        match run {
            None => self.timed_out(stage),
            Some(StageRun { result, value }) => {
                let passed = result.is_success() && value.is_some();
                self.record(result);
                if passed {
                    Ok(())
                } else {
                    Err(Halted)
                }
            }
        }
    }

    fn timed_out<T>(&mut self, stage: Stage) -> Result<T, Halted> {
        self.record(StageResult::fatal(stage, "timed out (run deadline reached)", 1));
        Err(Halted)
    }

    fn record(&mut self, result: StageResult) {
        if result.is_success() {
            info!("[{}] {}: {}", self.device.name, result.stage, result.detail);
        } else {
            warn!("[{}] {}: {}", self.device.name, result.stage, result.detail);
        }
        self.reporter.stage_finished(&result);
        self.history.push(result);
    }
}

/// Await `future`, giving up at `deadline`
async fn within<F: Future>(deadline: Option<Instant>, future: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, future).await.ok(),
        None => Some(future.await),
    }
}

/// Await an adapter call, turning an overrun into a transport timeout
async fn bounded<T, F>(timeout: Duration, future: F) -> TransportResult<T>
where
    F: Future<Output = TransportResult<T>>,
{
    tokio::time::timeout(timeout, future)
        .await
        .unwrap_or(Err(TransportError::TimedOut(timeout)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::StageResultKind;
    use crate::infrastructure::fake::{test_device, FakeBehavior, FakeLease, FakeTransport, Op};
    use tokio::sync::mpsc;

    async fn run_session(
        fake: Arc<FakeTransport>,
        device: DeviceSpec,
        settings: ConnectionSettings,
        deadline: Option<Instant>,
    ) -> SessionOutcome {
        let (tx, _rx) = mpsc::unbounded_channel();
        DeviceSession::new(
            Arc::new(device),
            fake.transports(),
            Arc::new(settings),
            tx,
            deadline,
        )
        .run()
        .await
    }

    fn stages(outcome: &SessionOutcome) -> Vec<Stage> {
        outcome.stages.iter().map(|s| s.stage).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_stages_succeed() {
        let device = test_device("cam1", "wlan0");
        let fake = Arc::new(FakeTransport::new().with_device(&device, FakeBehavior::default()));

        let outcome = run_session(fake.clone(), device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Connected);
        assert_eq!(
            stages(&outcome),
            vec![
                Stage::AwaitAdvertising,
                Stage::ActivateWifi,
                Stage::SettleWifiStart,
                Stage::PrepareInterface,
                Stage::Associate,
                Stage::AcquireAddress,
                Stage::InstallRoute,
                Stage::VerifyReachable,
            ]
        );
        assert!(outcome.stages.iter().all(|s| s.is_success()));
        assert!(outcome.stages.windows(2).all(|w| w[0].stage < w[1].stage));
        assert_eq!(outcome.address, Some(Ipv4Addr::new(10, 5, 5, 50)));
        assert_eq!(fake.calls(Op::ActivateWifi, "wlan0"), 1);
        assert_eq!(fake.calls(Op::Probe, "wlan0"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activation_exhaustion_never_reaches_associate() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            activate_failures: u32::MAX,
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake.clone(), device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Failed);
        let last = outcome.stages.last().unwrap();
        assert_eq!(last.stage, Stage::ActivateWifi);
        assert_eq!(last.kind, StageResultKind::Fatal);
        assert_eq!(last.attempts, 3);
        assert!(!stages(&outcome).contains(&Stage::Associate));
        assert_eq!(fake.calls(Op::ActivateWifi, "wlan0"), 3);
        assert_eq!(fake.calls(Op::ResetRadio, "radio"), 2);
        assert_eq!(fake.calls(Op::Associate, "wlan0"), 0);
        assert_eq!(fake.calls(Op::ResetInterface, "wlan0"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_address_is_fatal_on_first_attempt() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            activate_invalid: true,
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake.clone(), device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Failed);
        assert_eq!(fake.calls(Op::ActivateWifi, "wlan0"), 1);
        assert_eq!(fake.calls(Op::ResetRadio, "radio"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lease_timeout_falls_back_to_static_address() {
        let device = test_device("cam2", "wlan1");
        let behavior = FakeBehavior {
            lease: FakeLease::TimesOut,
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake.clone(), device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Connected);
        assert_eq!(fake.calls(Op::AcquireLease, "wlan1"), 1);
        assert_eq!(fake.calls(Op::AssignStatic, "wlan1"), 1);
        assert_eq!(fake.calls(Op::InstallRoute, "wlan1"), 1);
        assert_eq!(outcome.address, Some(Ipv4Addr::new(10, 5, 5, 101)));

        let acquire = outcome
            .stages
            .iter()
            .find(|s| s.stage == Stage::AcquireAddress)
            .unwrap();
        assert!(acquire.is_success());
        assert!(acquire.detail.contains("10.5.5.101/24"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_static_address_wins() {
        let mut device = test_device("cam2", "wlan1");
        device.static_address = Some(Ipv4Addr::new(10, 5, 5, 77));
        let behavior = FakeBehavior {
            lease: FakeLease::Fails,
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake, device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.address, Some(Ipv4Addr::new(10, 5, 5, 77)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_static_assignment_failure_is_fatal() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            lease: FakeLease::Fails,
            assign_fails: true,
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake.clone(), device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Failed);
        assert_eq!(outcome.stages.last().unwrap().stage, Stage::AcquireAddress);
        assert_eq!(fake.calls(Op::InstallRoute, "wlan0"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_failure_is_best_effort() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            route_fails: true,
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake, device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Connected);
        let route = outcome
            .stages
            .iter()
            .find(|s| s.stage == Stage::InstallRoute)
            .unwrap();
        assert_eq!(route.kind, StageResultKind::Retryable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepare_failure_is_fatal_after_one_attempt() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            reset_fails: true,
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake.clone(), device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Failed);
        assert_eq!(outcome.stages.last().unwrap().stage, Stage::PrepareInterface);
        assert_eq!(fake.calls(Op::ResetInterface, "wlan0"), 1);
        assert_eq!(fake.calls(Op::Associate, "wlan0"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_association_retries_then_succeeds() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            associate_failures: 2,
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake.clone(), device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Connected);
        assert_eq!(fake.calls(Op::Associate, "wlan0"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_retries_until_http_200() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            probe_statuses: vec![503, 503, 200],
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake.clone(), device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Connected);
        assert_eq!(outcome.stages.last().unwrap().attempts, 3);
        assert_eq!(fake.calls(Op::Probe, "wlan0"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_probe_gets_growing_attempt_timeout() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            probe_statuses: vec![503, 503, 200],
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));
        let mut settings = ConnectionSettings::default();
        settings.policies.verify_reachable.attempt_timeout_ms = 2_000;
        settings.policies.verify_reachable.timeout_step_ms = 1_000;

        let outcome = run_session(fake.clone(), device, settings, None).await;

        assert_eq!(outcome.status, SessionStatus::Connected);
        assert_eq!(
            fake.probe_timeouts("wlan0"),
            vec![
                Duration::from_secs(2),
                Duration::from_secs(3),
                Duration::from_secs(4),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_exhaustion_fails_session() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            probe_statuses: vec![404],
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));

        let outcome = run_session(fake.clone(), device, ConnectionSettings::default(), None).await;

        assert_eq!(outcome.status, SessionStatus::Failed);
        let last = outcome.stages.last().unwrap();
        assert_eq!(last.stage, Stage::VerifyReachable);
        assert!(last.detail.contains("HTTP 404"));
        assert_eq!(fake.calls(Op::Probe, "wlan0"), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_marks_stage_timed_out() {
        let device = test_device("cam1", "wlan0");
        let fake = Arc::new(FakeTransport::new().with_device(&device, FakeBehavior::default()));
        // Advertising settle is 8s and the access point settle another 5s
        let deadline = Instant::now() + Duration::from_secs(10);

        let outcome = run_session(
            fake.clone(),
            device,
            ConnectionSettings::default(),
            Some(deadline),
        )
        .await;

        assert_eq!(outcome.status, SessionStatus::Failed);
        let last = outcome.stages.last().unwrap();
        assert_eq!(last.stage, Stage::SettleWifiStart);
        assert!(last.detail.contains("timed out"));
        assert_eq!(fake.calls(Op::ResetInterface, "wlan0"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_reachable_camera_skips_pipeline() {
        let device = test_device("cam1", "wlan0");
        let fake = Arc::new(FakeTransport::new().with_device(&device, FakeBehavior::default()));
        let settings = ConnectionSettings {
            skip_if_reachable: true,
            ..Default::default()
        };

        let outcome = run_session(fake.clone(), device, settings, None).await;

        assert_eq!(outcome.status, SessionStatus::Connected);
        assert_eq!(stages(&outcome), vec![Stage::ProbeExisting]);
        assert_eq!(fake.calls(Op::ActivateWifi, "wlan0"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_precheck_runs_full_pipeline() {
        let device = test_device("cam1", "wlan0");
        let behavior = FakeBehavior {
            probe_statuses: vec![0, 200],
            ..Default::default()
        };
        let fake = Arc::new(FakeTransport::new().with_device(&device, behavior));
        let settings = ConnectionSettings {
            skip_if_reachable: true,
            ..Default::default()
        };

        let outcome = run_session(fake.clone(), device, settings, None).await;

        assert_eq!(outcome.status, SessionStatus::Connected);
        assert_eq!(outcome.stages[0].kind, StageResultKind::Retryable);
        assert_eq!(fake.calls(Op::ActivateWifi, "wlan0"), 1);
    }
}
