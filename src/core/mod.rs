//! Core functionality for noidea
//!
//! This module contains shared business logic including:
//! - Git repository operations
//! - Repository context detection
//! - Credential management
//! - Application configuration
//! - Git hook installation
//! - Release checks

pub mod config;
pub mod credentials;
pub mod git;
pub mod hooks;
pub mod repository;
pub mod update;

pub use config::Config;
pub use credentials::CredentialStore;
pub use git::GitRepository;
pub use repository::RepositoryContext;
