//! Random desktop User-Agent generation.
//!
//! Many news sites refuse the default client identity of HTTP libraries, so
//! each partition picks one plausible desktop browser identity (Chrome or
//! Firefox on macOS or Linux) and keeps it for all of its requests.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Desktop operating systems a generated User-Agent may claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopOs {
    Mac,
    Linux,
}

const LINUX_PLATFORMS: &[&str] = &[
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
];

/// Generate a User-Agent for Chrome or Firefox on one of `systems`.
///
/// Falls back to both macOS and Linux when `systems` is empty.
pub fn generate_user_agent<R: Rng + ?Sized>(rng: &mut R, systems: &[DesktopOs]) -> String {
    let os = systems
        .choose(rng)
        .copied()
        .unwrap_or_else(|| {
            if rng.random_bool(0.5) {
                DesktopOs::Mac
            } else {
                DesktopOs::Linux
            }
        });
    let firefox = rng.random_bool(0.5);

    if firefox {
        let version = rng.random_range(115..=131);
        let platform = match os {
            DesktopOs::Mac => format!(
                "Macintosh; Intel Mac OS X 10.{}",
                rng.random_range(13..=15)
            ),
            DesktopOs::Linux => pick_linux_platform(rng).to_string(),
        };
        format!("Mozilla/5.0 ({platform}; rv:{version}.0) Gecko/20100101 Firefox/{version}.0")
    } else {
        let major = rng.random_range(110..=130);
        let build = rng.random_range(5000..=6800);
        let patch = rng.random_range(0..=200);
        let platform = match os {
            DesktopOs::Mac => format!(
                "Macintosh; Intel Mac OS X 10_{}_{}",
                rng.random_range(13..=15),
                rng.random_range(0..=7)
            ),
            DesktopOs::Linux => pick_linux_platform(rng).to_string(),
        };
        format!(
            "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{major}.0.{build}.{patch} Safari/537.36"
        )
    }
}

fn pick_linux_platform<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    LINUX_PLATFORMS.choose(rng).copied().unwrap_or("X11; Linux x86_64")
}

/// User-Agent for one partition, drawn from the thread-local RNG.
pub fn random_desktop_user_agent() -> String {
    generate_user_agent(&mut rand::rng(), &[DesktopOs::Mac, DesktopOs::Linux])
}
