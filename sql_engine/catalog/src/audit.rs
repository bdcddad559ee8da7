// Copyright 2020 - present Alex Dukhno
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Auditable record of one dropped view, written in the same transaction as
/// the descriptor updates it reports on.
#[derive(Debug, Clone, PartialEq)]
pub struct DropViewEvent {
    pub view_name: String,
    pub statement: String,
    pub user: String,
    /// Names of the additional views removed by cascading, depth-first with
    /// each dependent reported after its own cascade.
    pub cascade_dropped_views: Vec<String>,
}
