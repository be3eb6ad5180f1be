//! Distgen Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the distgen
//! contract generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           distgen-cli (CLI)             │
//! │   (flags, config, logging, exit codes)  │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │            (GenerateService)            │
//! │   read template → render → write file   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │      (Driven: Filesystem, Renderer)     │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    distgen-adapters (Infrastructure)    │
//! │ (LocalFilesystem, PlaceholderRenderer)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │   (Template, Bindings, RenderedOutput)  │
//! │         No External Dependencies        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use distgen_core::domain::{Bindings, MissingVariablePolicy, Network, Template};
//!
//! let network = Network::new("rinkeby").unwrap();
//! let bindings = Bindings::for_network(&network);
//!
//! let template = Template::parse("distributor for {{ network }}").unwrap();
//! let rendered = template.render(&bindings, MissingVariablePolicy::Empty).unwrap();
//!
//! assert_eq!(rendered.as_str(), "distributor for rinkeby");
//! ```

pub mod domain;

pub mod application;

pub mod error;
