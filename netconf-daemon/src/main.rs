//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

mod config;
mod handlers;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{App, Arg};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use config::{Config, LoggingFmtStyle};
use netconf_session::reactor::{self, ReactorConfig};
use netconf_session::rpc::RpcRegistry;
use netconf_session::session::SessionRegistry;
use netconf_session::hello;
use netconf_utils::clock::SystemClock;
use netconf_yang::YangSpec;

fn init_tracing(config: &config::Logging) {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(config.stdout.colors);
    let layer = match config.stdout.style {
        LoggingFmtStyle::Compact => layer.compact().boxed(),
        LoggingFmtStyle::Full => layer.boxed(),
        LoggingFmtStyle::Json => layer.json().boxed(),
        LoggingFmtStyle::Pretty => layer.pretty().boxed(),
    };

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("netconfd=info".parse().unwrap())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();
}

fn build_rpc_registry(registry: Arc<Mutex<SessionRegistry>>, yang: Arc<YangSpec>) -> RpcRegistry {
    let mut rpc_registry = RpcRegistry::new();
    rpc_registry.register(
        handlers::BASE_NAMESPACE,
        "close-session",
        Box::new(handlers::CloseSession),
    );
    rpc_registry.register(
        handlers::BASE_NAMESPACE,
        "get",
        Box::new(handlers::GetMonitoring::new(registry)),
    );
    rpc_registry.register(
        handlers::MONITORING_NAMESPACE,
        "get-schema",
        Box::new(handlers::GetSchema::new(yang)),
    );
    rpc_registry
}

async fn run_server(config: Config, yang_dir_loaded: bool) {
    let yang = if yang_dir_loaded {
        match netconf_yang::loader::load_dir(&config.yang_dir) {
            Ok(spec) => Arc::new(spec),
            Err(error) => {
                error.log();
                Arc::new(YangSpec::default())
            }
        }
    } else {
        info!(dir = %config.yang_dir, "no YANG modules loaded; binding mode NONE will be used");
        Arc::new(YangSpec::default())
    };

    let listener = match TcpListener::bind(&config.listen_address).await {
        Ok(listener) => listener,
        Err(error) => {
            error!(%error, address = %config.listen_address, "failed to bind listening socket");
            std::process::exit(1);
        }
    };
    info!(address = %config.listen_address, "listening for NETCONF sessions");

    let registry = Arc::new(Mutex::new(SessionRegistry::new(Arc::new(SystemClock))));
    let rpc_registry = Arc::new(build_rpc_registry(registry.clone(), yang));
    let reactor_config = Arc::new(ReactorConfig {
        capabilities: vec![hello::BASE_1_0.to_string(), hello::BASE_1_1.to_string()],
        idle_timeout: Duration::from_secs(config.idle_timeout_secs),
        rpc_deadline: Duration::from_secs(config.rpc_deadline_secs),
    });

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                error!(%error, "failed to accept connection");
                continue;
            }
        };

        let registry = registry.clone();
        let rpc_registry = rpc_registry.clone();
        let reactor_config = reactor_config.clone();
        tokio::task::spawn_local(async move {
            let result = reactor::run(
                socket,
                registry,
                rpc_registry,
                &reactor_config,
                peer.ip().to_string(),
                "tcp",
                "anonymous",
            )
            .await;
            if let Err(error) = result {
                error.log();
            }
        });
    }
}

// ===== main =====

fn main() {
    let matches = App::new("netconfd")
        .version(clap::crate_version!())
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .get_matches();

    let config_file = matches.value_of("config");
    let config = Config::load(config_file);

    init_tracing(&config.logging);
    info!("starting up");

    let yang_dir_loaded = std::path::Path::new(&config.yang_dir).is_dir();

    // Single-threaded cooperative event loop (`spec.md` §5 "Scheduling
    // model"): one reactor thread, sessions as tasks on a `LocalSet`.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create async runtime");
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run_server(config, yang_dir_loaded));
}
