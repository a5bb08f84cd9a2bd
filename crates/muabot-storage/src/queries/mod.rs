// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod accounts;
pub mod conversations;
pub mod inbound;
pub mod offers;
pub mod orders;
pub mod partners;
