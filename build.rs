// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn version_arg() -> Arg {
    Arg::new("version").help("Upstream Go version (default: newest)")
}

fn build_cli() -> Command {
    Command::new("godeb")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build and install Debian packages from upstream Go release tarballs")
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("arch")
                .long("arch")
                .value_name("ARCH")
                .global(true)
                .help("Target architecture in upstream naming (amd64, 386, arm64, ...)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(Command::new("list").about("List available Go versions, newest first"))
        .subcommand(
            Command::new("download")
                .about("Build a package for a Go version and leave it in the output directory")
                .arg(version_arg()),
        )
        .subcommand(
            Command::new("install")
                .about("Build and install a package for a Go version")
                .arg(version_arg()),
        )
        .subcommand(Command::new("remove").about("Remove the installed go package"))
        .subcommand(
            Command::new("fromtarball")
                .about("Build a package from a local upstream tarball")
                .arg(Arg::new("tarball").required(true).help("Path to a go<version>.linux-<arch>.tar.gz file"))
                .arg(Arg::new("version").required(true).help("Upstream version contained in the tarball"))
                .arg(
                    Arg::new("no_install")
                        .long("no-install")
                        .action(ArgAction::SetTrue)
                        .help("Only build the package, do not install it"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("godeb.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
