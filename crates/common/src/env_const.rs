// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub const FIELDBATCH_LOG: &str = "FIELDBATCH_LOG";

pub const FIELDBATCH_MAX_CONCURRENT_GROUPS: &str = "FIELDBATCH_MAX_CONCURRENT_GROUPS";
pub const FIELDBATCH_DEFAULT_SELECTION_DEPTH: &str = "FIELDBATCH_DEFAULT_SELECTION_DEPTH";
pub const FIELDBATCH_QUERY_DEPTH_LIMIT: &str = "FIELDBATCH_QUERY_DEPTH_LIMIT";
