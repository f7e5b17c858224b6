use std::path::PathBuf;

use anyhow::Context;
use aya::maps::ProgramArray;
use aya::programs::{Xdp, XdpFlags};
use aya::Ebpf;
use clap::{Parser, ValueEnum};
use echo_element::{EchoConfig, MUTATOR_SLOT};
use log::info;
use tokio::signal;

const JUMP_TABLE: &str = "JUMP_TABLE";
const CLASSIFIER_PROGRAM: &str = "classifier";
const ECHO_PROGRAM: &str = "echo";

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Variant {
    /// Bounce ICMP with the Ethernet addresses swapped
    Icmp,
    /// Bounce UDP with addresses and ports swapped on every layer
    Udp,
}

impl Variant {
    fn config(self) -> EchoConfig {
        match self {
            Variant::Icmp => EchoConfig::ICMP,
            Variant::Udp => EchoConfig::UDP,
        }
    }

    fn package(self) -> &'static str {
        match self {
            Variant::Icmp => "icmp-echo",
            Variant::Udp => "udp-echo",
        }
    }

    /// Where `cargo xtask build-<variant>-echo-ebpf` leaves the object.
    fn default_object(self, release: bool) -> PathBuf {
        let profile = if release { "release" } else { "debug" };
        PathBuf::from("ebpf")
            .join(format!("{}-ebpf", self.package()))
            .join("target/bpfel-unknown-none")
            .join(profile)
            .join(self.package())
    }
}

#[derive(Debug, Parser)]
struct Opt {
    /// Interface to attach the classifier to
    #[clap(short, long, default_value = "eth0")]
    iface: String,
    #[clap(long, value_enum, default_value_t = Variant::Icmp)]
    variant: Variant,
    /// Program object, defaults to the xtask build output for the variant
    #[clap(long)]
    object: Option<PathBuf>,
    /// Look for the debug build instead of the release build
    #[clap(long)]
    debug_build: bool,
    /// Attach in generic (SKB) mode instead of the driver's native mode
    #[clap(long)]
    skb_mode: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    env_logger::init();

    let config = opt.variant.config();
    let object = opt
        .object
        .clone()
        .unwrap_or_else(|| opt.variant.default_object(!opt.debug_build));

    info!(
        "loading {} (protocol {}, {:?} echo)",
        object.display(),
        config.target_proto(),
        config.depth
    );
    let mut bpf = Ebpf::load_file(&object)
        .with_context(|| format!("failed to load {}", object.display()))?;

    let mut jump_table = ProgramArray::try_from(
        bpf.take_map(JUMP_TABLE)
            .with_context(|| format!("no {JUMP_TABLE} map in object"))?,
    )?;

    // the jump table has to be populated before the classifier sees traffic
    let echo: &mut Xdp = bpf
        .program_mut(ECHO_PROGRAM)
        .with_context(|| format!("no {ECHO_PROGRAM} program in object"))?
        .try_into()?;
    echo.load().context("failed to load echo program")?;
    jump_table
        .set(MUTATOR_SLOT, echo.fd()?, 0)
        .context("failed to populate jump table")?;
    info!("{ECHO_PROGRAM} stored in {JUMP_TABLE} slot {MUTATOR_SLOT}");

    let classifier: &mut Xdp = bpf
        .program_mut(CLASSIFIER_PROGRAM)
        .with_context(|| format!("no {CLASSIFIER_PROGRAM} program in object"))?
        .try_into()?;
    classifier.load().context("failed to load classifier program")?;

    let flags = if opt.skb_mode {
        XdpFlags::SKB_MODE
    } else {
        XdpFlags::default()
    };
    let link = classifier
        .attach(&opt.iface, flags)
        .with_context(|| format!("failed to attach {CLASSIFIER_PROGRAM} to {}", opt.iface))?;

    info!("{CLASSIFIER_PROGRAM} attached to {}. Press Ctrl-C to exit.", opt.iface);
    signal::ctrl_c().await?;

    info!("detaching from {}", opt.iface);
    classifier.detach(link)?;

    Ok(())
}
