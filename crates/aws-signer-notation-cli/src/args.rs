use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "notation-aws-signer",
    version = aws_signer_notation::VERSION,
    about = "AWS Signer plugin for Notation",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

/// Contract commands. Requests are read from stdin as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print plugin metadata
    GetPluginMetadata,
    /// Not supported by this plugin
    DescribeKey,
    /// Not supported by this plugin
    GenerateSignature,
    /// Sign a payload with an AWS Signer signing profile
    GenerateEnvelope,
    /// Check trusted identity and revocation status of a signature
    VerifySignature,
    /// Print the plugin version
    Version,
}
