/*!
bgpkit-originas maps IP addresses to the autonomous system originating them, using text routing
table dumps ("show ip bgp" output) as the source of truth.

Work happens in three phases:

1. **build**: every dump is parsed; for each selected route the AS path is interned and the
   announced block is recorded with the path's last AS as its origin. The first announcement of
   a block wins.
2. **normalize**: overlapping blocks of each address family are deaggregated into a disjoint
   partition in which a more specific announcement owns the addresses it covers. Adjacent ranges
   with equal origins may be merged afterwards.
3. **serve**: delimited records are annotated field by field with the origin of the range
   containing each address.

```no_run
use bgpkit_originas::{AnnotateOptions, Annotator, OriginIndex};

let index = OriginIndex::from_dumps(&["bgp4.txt", "bgp6.txt.gz"], true).unwrap();
let annotator = Annotator::new(&index, AnnotateOptions::default());
println!("{}", annotator.annotate_record("10.1.5.5"));
```
*/

pub mod annotate;
pub mod error;
pub mod index;
mod io;
pub mod models;
pub mod parser;
pub mod table;

pub use annotate::{parse_fields, resolve, AnnotateOptions, Annotator, QueryToken};
pub use error::OriginAsError;
pub use index::{BuildStats, OriginIndex, OriginIndexBuilder, OriginMatch, RouteOutcome};
pub use parser::AsNameDirectory;
