pub mod param;

use crate::Service;

/// A Reporter operation and the parameter keys it accepts, in the positional
/// order the provider expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub service: Service,
    pub name: &'static str,
    pub keys: &'static [&'static str],
}

impl Operation {
    /// `Namespace.operation`, as written in `queryInput`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.service.namespace(), self.name)
    }
}

macro_rules! impl_operations {
    ($service:expr => $($const_name:ident, $name:expr, [$($key:expr),* $(,)?];)+) => {
        $(
            pub const $const_name: Operation = Operation {
                service: $service,
                name: $name,
                keys: &[$($key),*],
            };
        )+

        /// Every operation of this service.
        pub const ALL: &[Operation] = &[$($const_name),+];

        /// Looks an operation up by its provider name, e.g. `getReport`.
        #[must_use]
        pub fn find(name: &str) -> Option<Operation> {
            ALL.iter().copied().find(|op| op.name == name)
        }
    };
}

pub mod sales {
    use super::Operation;
    use crate::Service;

    impl_operations!(Service::Sales =>
        GET_ACCOUNTS, "getAccounts", [];
        GET_REPORT, "getReport", ["vendorNumber", "reportType", "reportSubType", "dateType", "date", "reportVersion"];
        GET_STATUS, "getStatus", [];
        GET_VENDORS, "getVendors", [];
        VIEW_TOKEN, "viewToken", [];
        GENERATE_TOKEN, "generateToken", [];
    );
}

pub mod finance {
    use super::Operation;
    use crate::Service;

    impl_operations!(Service::Finance =>
        GET_ACCOUNTS, "getAccounts", [];
        GET_REPORT, "getReport", ["vendorNumber", "regionCode", "reportType", "fiscalYear", "fiscalPeriod"];
        GET_STATUS, "getStatus", [];
        GET_VENDORS_AND_REGIONS, "getVendorsAndRegions", [];
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_names() {
        assert_eq!(sales::GET_REPORT.qualified_name(), "Sales.getReport");
        assert_eq!(
            finance::GET_VENDORS_AND_REGIONS.qualified_name(),
            "Finance.getVendorsAndRegions"
        );
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(sales::find("viewToken"), Some(sales::VIEW_TOKEN));
        assert_eq!(finance::find("getReport").map(|op| op.keys.len()), Some(5));
        assert_eq!(finance::find("getVendors"), None);
        assert!(sales::ALL.iter().all(|op| op.service == Service::Sales));
    }
}
