// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod backup;
pub mod categories;
pub mod exporter;
pub mod installments;
pub mod recurring;
pub mod reports;
pub mod transactions;
