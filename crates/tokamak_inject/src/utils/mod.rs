/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

pub mod atomic_once_cell;

#[allow(dead_code)]
pub const fn ensure_send<T: Send>() -> () {}

#[allow(dead_code)]
pub const fn ensure_sync<T: Sync>() -> () {}

#[allow(dead_code)]
pub const fn ensure_clone<T: Clone>() -> () {}
