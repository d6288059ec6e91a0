use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use std::time::Duration;

use rand::random;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, ICMP};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{ProbeResult, Prober};

const PAYLOAD: [u8; 56] = [0; 56];

/// ICMP echo prober.
///
/// Sends `attempts` echo requests, each bounded by `timeout`. Success means
/// at least one reply came back. The whole operation, address resolution
/// included, never takes longer than `timeout × attempts`.
pub struct IcmpProber {
    v4: Client,
    v6: Option<Client>,
    attempts: u16,
    timeout: Duration,
}

impl IcmpProber {
    /// Open the ICMP sockets. Fails when the process may not create them
    /// (missing `CAP_NET_RAW` and no unprivileged ping group).
    pub fn new(attempts: u16, timeout: Duration) -> std::io::Result<Self> {
        let v4 = Client::new(&Config::default())?;
        let v6 = match Client::new(&Config::builder().kind(ICMP::V6).build()) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "IPv6 ICMP socket unavailable, IPv6 targets will fail");
                None
            }
        };

        Ok(Self {
            v4,
            v6,
            attempts: attempts.max(1),
            timeout,
        })
    }

    fn budget(&self) -> Duration {
        self.timeout * u32::from(self.attempts)
    }

    async fn echo(&self, ip: IpAddr) -> bool {
        let client = match (ip, &self.v6) {
            (IpAddr::V4(_), _) => &self.v4,
            (IpAddr::V6(_), Some(v6)) => v6,
            (IpAddr::V6(_), None) => return false,
        };

        let mut pinger = client.pinger(ip, PingIdentifier(random())).await;
        pinger.timeout(self.timeout);

        let mut replied = false;
        for seq in 0..self.attempts {
            match pinger.ping(PingSequence(seq), &PAYLOAD).await {
                Ok((_packet, rtt)) => {
                    debug!(%ip, seq, rtt_ms = rtt.as_millis() as u64, "Echo reply");
                    replied = true;
                }
                Err(e) => debug!(%ip, seq, error = %e, "Echo attempt failed"),
            }
        }
        replied
    }

    async fn run(&self, address: &str) -> ProbeResult {
        if address.is_empty() {
            return ProbeResult::failed();
        }

        let result = bounded(self.budget(), async {
            let Some(ip) = resolve_target(address).await else {
                debug!(address, "Address did not resolve");
                return false;
            };
            self.echo(ip).await
        })
        .await;

        if !result.success {
            debug!(address, budget_ms = self.budget().as_millis() as u64, "No reply within budget");
        }
        result
    }
}

/// Run `check` for at most `budget`.
///
/// Latency is the wall clock of the whole check when it returns `true`.
/// A `false` answer and an exhausted budget both yield [`ProbeResult::failed`].
pub(crate) async fn bounded<F>(budget: Duration, check: F) -> ProbeResult
where
    F: Future<Output = bool>,
{
    let started = Instant::now();
    match tokio::time::timeout(budget, check).await {
        Ok(true) => ProbeResult::succeeded(started.elapsed().as_millis() as u64),
        Ok(false) | Err(_) => ProbeResult::failed(),
    }
}

impl Prober for IcmpProber {
    fn probe<'a>(&'a self, address: &'a str) -> Pin<Box<dyn Future<Output = ProbeResult> + Send + 'a>> {
        Box::pin(self.run(address))
    }
}

/// Parse an IP literal, or resolve a host name to its first address.
pub async fn resolve_target(address: &str) -> Option<IpAddr> {
    if address.is_empty() {
        return None;
    }
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Some(ip);
    }
    tokio::net::lookup_host((address, 0))
        .await
        .ok()?
        .next()
        .map(|addr| addr.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_gives_up_at_the_budget() {
        let budget = Duration::from_secs(4);
        let started = Instant::now();

        let result = bounded(budget, std::future::pending::<bool>()).await;

        assert_eq!(result, ProbeResult::failed());
        let waited = started.elapsed();
        assert!(waited >= budget, "returned after {:?}", waited);
        assert!(waited < budget + Duration::from_millis(10), "returned after {:?}", waited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_measures_a_reply() {
        let result = bounded(Duration::from_secs(4), async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            true
        })
        .await;

        assert!(result.success);
        assert!((30..40).contains(&result.latency_ms), "latency {}", result.latency_ms);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_negative_answer_is_a_failure() {
        let started = Instant::now();

        let result = bounded(Duration::from_secs(4), async { false }).await;

        assert_eq!(result, ProbeResult::failed());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_resolve_ip_literal() {
        assert_eq!(resolve_target("10.0.0.5").await, Some("10.0.0.5".parse().unwrap()));
        assert_eq!(resolve_target("fd00::1").await, Some("fd00::1".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_resolve_empty_address() {
        assert_eq!(resolve_target("").await, None);
    }

    #[tokio::test]
    async fn test_resolve_garbage() {
        assert_eq!(resolve_target("not a host name!").await, None);
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let ip = resolve_target("localhost").await;
        assert!(ip.is_some_and(|ip| ip.is_loopback()));
    }
}
