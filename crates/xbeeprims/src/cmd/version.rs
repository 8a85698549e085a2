use serde::Serialize;
use xbeeprims_frame::{ApiId, MAX_PACKET_SIZE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    profile: &'static str,
    serial: bool,
    max_packet_size: usize,
    api_ids: Vec<String>,
}

impl BuildInfo {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            target: option_env!("XBEEPRIMS_BUILD_TARGET").unwrap_or("unknown"),
            profile: option_env!("XBEEPRIMS_BUILD_PROFILE").unwrap_or("unknown"),
            serial: cfg!(unix),
            max_packet_size: MAX_PACKET_SIZE,
            api_ids: ApiId::ALL
                .iter()
                .map(|kind| format!("0x{:02X} {kind}", kind.as_byte()))
                .collect(),
        }
    }
}

pub fn run(args: VersionArgs, format: OutputFormat) -> CliResult<i32> {
    if !args.extended {
        println!("xbeeprims {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let info = BuildInfo::current();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&info).unwrap_or_else(|_| "{}".to_string())
        ),
        _ => {
            println!("{} {}", info.name, info.version);
            println!("  target:          {}", info.target);
            println!("  profile:         {}", info.profile);
            println!("  serial devices:  {}", if info.serial { "yes" } else { "no" });
            println!("  max packet size: {}", info.max_packet_size);
            println!("  api ids:");
            for kind in &info.api_ids {
                println!("    {kind}");
            }
        }
    }
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_lists_every_kind() {
        let info = BuildInfo::current();
        assert_eq!(info.name, "xbeeprims");
        assert_eq!(info.api_ids.len(), ApiId::ALL.len());
        assert_eq!(info.api_ids[0], "0x00 TX64");
        assert_eq!(info.api_ids[9], "0x89 TX_STATUS");
    }
}
