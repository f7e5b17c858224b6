mod build_ebpf;

use std::process::exit;

use clap::Parser;

#[derive(Debug, Parser)]
pub struct Options {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Basic variant: ICMP, Ethernet swap only
    BuildIcmpEchoEbpf(build_ebpf::Options),
    /// Extended variant: UDP, swap on every layer
    BuildUdpEchoEbpf(build_ebpf::Options),
    /// Both variants
    BuildEbpf(build_ebpf::Options),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::BuildIcmpEchoEbpf(opts) => build_ebpf::build_ebpf("icmp-echo-ebpf", &opts),
            Command::BuildUdpEchoEbpf(opts) => build_ebpf::build_ebpf("udp-echo-ebpf", &opts),
            Command::BuildEbpf(opts) => ["icmp-echo-ebpf", "udp-echo-ebpf"]
                .into_iter()
                .try_for_each(|package| build_ebpf::build_ebpf(package, &opts)),
        }
    }
}

fn main() {
    if let Err(e) = Options::parse().command.run() {
        eprintln!("{e:#}");
        exit(1);
    }
}
