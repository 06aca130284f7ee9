//! Data and test doubles shared by unit tests across the crate.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use crate::{error::Result, fetch::TextFetcher};

// A shortened GSD response in the shape the model sounding provider returns.
pub const GSD_TABLE: &str = "\
GFS analysis valid for grid point 10.2 nm / 243 deg from 32.577899,35.179972:
   GFS         12      10      Jun    2018
  CAPE    791    CIN   -238  Helic  99999     PW     17
      1  23062  99999  32.50 -35.00  99999  99999
      2  99999  99999  99999     35  99999  99999
      3           32.577899,35.179972   12     kt
      9  10000     69    281    181    256     13
      4   9750    292    260    166    255     15
      4   9500    521    246    133    255     15
      4   9250    754    243     73    257     16
      4   9000    994    246    -21    262     17
      4   8500   1491    220    -62    272     20
      4   8000   2013    190   -101    281     24
      4   7500   2561    147   -108    285     27
      4   7000   3139    102   -138    286     27
      4   6500   3749     57  99999    288     24
      4   6000   4398     12   -259    287     23
";

// The same response cut down to fewer levels than the minimum.
pub const GSD_TABLE_SHORT: &str = "\
GFS analysis valid for grid point 10.2 nm / 243 deg from 32.577899,35.179972:
   GFS         12      10      Jun    2018
  CAPE    791    CIN   -238  Helic  99999     PW     17
      1  23062  99999  32.50 -35.00  99999  99999
      2  99999  99999  99999     35  99999  99999
      3           32.577899,35.179972   12     kt
      9  10000     69    281    181    256     13
      4   9750    292    260    166    255     15
";

// A shortened observation table in the shape the university site returns inside its
// preformatted block.
pub const UWYO_TABLE: &str = "\
-----------------------------------------------------------------------------
   PRES   HGHT   TEMP   DWPT   RELH   MIXR   DRCT   SKNT   THTA   THTE   THTV
    hPa     m      C      C      %    g/kg    deg   knot     K      K      K
-----------------------------------------------------------------------------
 1000.0    110
  925.0    799   14.0   11.2     83   8.93    150     13  301.0  327.4  302.6
  850.0   1525   10.2    6.2     76   7.19    185     17  304.4  326.2  305.7
  800.0   2022    7.0    2.0     71   6.21    200     19  306.3  325.0  307.4
  750.0   2541    4.2   -1.3     67   5.32    212     20  308.5  324.6  309.5
  700.0   3143    1.2   -3.8     69   4.58    225     21  310.6  325.1  311.5
  650.0   3781   -2.1   -7.1     68   3.88    235     24  312.4  324.8  313.2
";

/// Wrap a table in the HTML page shape the observation site serves.
pub fn uwyo_page(table: &str) -> String {
    format!(
        "<HTML><TITLE>Sounding</TITLE><BODY><H2>40179 Observations</H2><PRE>\n{}</PRE>\
         <H3>Station information</H3><PRE>Station elevation: 110.0</PRE></BODY></HTML>",
        table
    )
}

type RespondFn = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// A fetcher double that counts calls and answers from a URL keyed script.
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
    respond: RespondFn,
}

impl ScriptedFetcher {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        ScriptedFetcher {
            calls: AtomicUsize::new(0),
            urls: Mutex::new(vec![]),
            respond: Box::new(respond),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl TextFetcher for ScriptedFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        (self.respond)(url)
    }
}
