//! Static mapping from dashboard entities to their REST collections.

use serde::Serialize;

use crate::descriptor::{ColumnSpec, Render, ResourceDescriptor, UpdateMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Entity {
    Branches,
    Receipts,
    Sales,
    Purchases,
    Employees,
    Customers,
    Products,
    Roles,
    Suppliers,
    Invoices,
    Payments,
    Loans,
    Ledger,
    CompanyProfile,
    SalesReport,
    PurchasesReport,
    ProfitLossReport,
    StockReport,
}

impl Entity {
    pub fn all() -> &'static [Entity] {
        use Entity::*;
        &[
            Branches,
            Receipts,
            Sales,
            Purchases,
            Employees,
            Customers,
            Products,
            Roles,
            Suppliers,
            Invoices,
            Payments,
            Loans,
            Ledger,
            CompanyProfile,
            SalesReport,
            PurchasesReport,
            ProfitLossReport,
            StockReport,
        ]
    }

    /// URL segment used under `/dashboard`.
    pub fn slug(&self) -> &'static str {
        match self {
            Entity::Branches => "branches",
            Entity::Receipts => "receipts",
            Entity::Sales => "sales",
            Entity::Purchases => "purchases",
            Entity::Employees => "employees",
            Entity::Customers => "customers",
            Entity::Products => "products",
            Entity::Roles => "roles",
            Entity::Suppliers => "suppliers",
            Entity::Invoices => "invoices",
            Entity::Payments => "payments",
            Entity::Loans => "loans",
            Entity::Ledger => "ledger",
            Entity::CompanyProfile => "company-profile",
            Entity::SalesReport => "sales-report",
            Entity::PurchasesReport => "purchases-report",
            Entity::ProfitLossReport => "profit-loss-report",
            Entity::StockReport => "stock-report",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Entity> {
        Self::all().iter().copied().find(|e| e.slug() == slug)
    }

    pub fn base_path(&self) -> &'static str {
        match self {
            Entity::Branches => "/branches",
            Entity::Receipts => "/receipts",
            Entity::Sales => "/sales",
            Entity::Purchases => "/purchases",
            Entity::Employees => "/employees",
            Entity::Customers => "/customers",
            Entity::Products => "/products",
            Entity::Roles => "/roles",
            Entity::Suppliers => "/suppliers",
            Entity::Invoices => "/invoices",
            Entity::Payments => "/payments",
            Entity::Loans => "/loans",
            Entity::Ledger => "/ledger",
            Entity::CompanyProfile => "/company-profile",
            Entity::SalesReport => "/reports/sales",
            Entity::PurchasesReport => "/reports/purchases",
            Entity::ProfitLossReport => "/reports/profit-loss",
            Entity::StockReport => "/reports/stock",
        }
    }

    /// Aggregate endpoints are read-only.
    pub fn is_report(&self) -> bool {
        matches!(
            self,
            Entity::SalesReport
                | Entity::PurchasesReport
                | Entity::ProfitLossReport
                | Entity::StockReport
        )
    }

    pub fn descriptor(&self) -> ResourceDescriptor {
        let mut base = ResourceDescriptor::new(self.slug(), self.base_path());
        if self.is_report() {
            base = base.read_only();
        }
        match self {
            Entity::Branches => base
                .column(ColumnSpec::new("Name", "name").sortable())
                .column(ColumnSpec::new("Code", "code").sortable())
                .column(ColumnSpec::new("City", "city").sortable())
                .column(ColumnSpec::new("Phone", "phone"))
                .search(["name", "code", "city"]),
            Entity::Receipts => base
                .column(ColumnSpec::new("Receipt #", "number").sortable())
                .column(ColumnSpec::new("Customer", "customer.name").sort_by("customer"))
                .column(ColumnSpec::new("Amount", "amount").sortable().render(Render::Currency))
                .column(ColumnSpec::new("Date", "date").sortable().render(Render::Date))
                .search(["number"])
                .populate(["customer", "branch"]),
            Entity::Sales => base
                .column(ColumnSpec::new("Invoice #", "invoiceNumber").sortable())
                .column(ColumnSpec::new("Customer", "customer.name").sort_by("customer"))
                .column(ColumnSpec::new("Branch", "branch.name"))
                .column(ColumnSpec::new("Total", "total").sortable().render(Render::Currency))
                .column(ColumnSpec::new("Date", "date").sortable().render(Render::Date))
                .search(["invoiceNumber"])
                .populate(["customer", "branch", "products"]),
            Entity::Purchases => base
                .column(ColumnSpec::new("Reference", "reference").sortable())
                .column(ColumnSpec::new("Supplier", "supplier.name").sort_by("supplier"))
                .column(ColumnSpec::new("Branch", "branch.name"))
                .column(ColumnSpec::new("Total", "total").sortable().render(Render::Currency))
                .column(ColumnSpec::new("Date", "date").sortable().render(Render::Date))
                .search(["reference"])
                .populate(["supplier", "branch", "products"]),
            Entity::Employees => base
                .column(ColumnSpec::new("Name", "name").sortable())
                .column(ColumnSpec::new("Email", "email").sortable())
                .column(ColumnSpec::new("Role", "role.name"))
                .column(ColumnSpec::new("Branch", "branch.name"))
                .search(["name", "email"])
                .populate(["role", "branch"]),
            Entity::Customers => base
                .column(ColumnSpec::new("Name", "name").sortable())
                .column(ColumnSpec::new("Phone", "phone"))
                .column(ColumnSpec::new("Email", "email").sortable())
                .column(ColumnSpec::new("Balance", "balance").sortable().render(Render::Currency))
                .search(["name", "phone", "email"]),
            Entity::Products => base
                .column(ColumnSpec::new("SKU", "sku").sortable())
                .column(ColumnSpec::new("Name", "name").sortable())
                .column(ColumnSpec::new("Price", "price").sortable().render(Render::Currency))
                .column(ColumnSpec::new("Stock", "stock").sortable().render(Render::Number))
                .search(["sku", "name"])
                .update_method(UpdateMethod::Patch),
            Entity::Roles => base
                .column(ColumnSpec::new("Name", "name").sortable())
                .column(ColumnSpec::new("Description", "description"))
                .search(["name"]),
            Entity::Suppliers => base
                .column(ColumnSpec::new("Name", "name").sortable())
                .column(ColumnSpec::new("Contact", "contactPerson"))
                .column(ColumnSpec::new("Phone", "phone"))
                .column(ColumnSpec::new("Balance", "balance").sortable().render(Render::Currency))
                .search(["name", "contactPerson", "phone"]),
            Entity::Invoices => base
                .column(ColumnSpec::new("Invoice #", "number").sortable())
                .column(ColumnSpec::new("Customer", "customer.name").sort_by("customer"))
                .column(ColumnSpec::new("Due", "dueDate").sortable().render(Render::Date))
                .column(ColumnSpec::new("Total", "total").sortable().render(Render::Currency))
                .column(ColumnSpec::new("Paid", "paid").render(Render::Boolean))
                .search(["number"])
                .populate(["customer"]),
            Entity::Payments => base
                .column(ColumnSpec::new("Reference", "reference").sortable())
                .column(ColumnSpec::new("Invoice", "invoice.number"))
                .column(ColumnSpec::new("Method", "method").sortable())
                .column(ColumnSpec::new("Amount", "amount").sortable().render(Render::Currency))
                .column(ColumnSpec::new("Date", "date").sortable().render(Render::Date))
                .search(["reference", "method"])
                .populate(["invoice"]),
            Entity::Loans => base
                .column(ColumnSpec::new("Borrower", "employee.name").sort_by("employee"))
                .column(ColumnSpec::new("Principal", "amount").sortable().render(Render::Currency))
                .column(ColumnSpec::new("Outstanding", "balance").sortable().render(Render::Currency))
                .column(ColumnSpec::new("Issued", "issuedAt").sortable().render(Render::Date))
                .search(["reference"])
                .populate(["employee"]),
            Entity::Ledger => base
                .column(ColumnSpec::new("Date", "date").sortable().render(Render::Date))
                .column(ColumnSpec::new("Account", "account").sortable())
                .column(ColumnSpec::new("Description", "description"))
                .column(ColumnSpec::new("Debit", "debit").render(Render::Currency))
                .column(ColumnSpec::new("Credit", "credit").render(Render::Currency))
                .search(["account", "description"]),
            Entity::CompanyProfile => base
                .column(ColumnSpec::new("Company", "name"))
                .column(ColumnSpec::new("Tax ID", "taxId"))
                .column(ColumnSpec::new("Address", "address"))
                .column(ColumnSpec::new("Currency", "currency"))
                .update_method(UpdateMethod::Patch),
            Entity::SalesReport | Entity::PurchasesReport => base
                .column(ColumnSpec::new("Period", "period").sortable())
                .column(ColumnSpec::new("Branch", "branch.name"))
                .column(ColumnSpec::new("Count", "count").sortable().render(Render::Number))
                .column(ColumnSpec::new("Total", "total").sortable().render(Render::Currency))
                .populate(["branch"]),
            Entity::ProfitLossReport => base
                .column(ColumnSpec::new("Period", "period").sortable())
                .column(ColumnSpec::new("Revenue", "revenue").render(Render::Currency))
                .column(ColumnSpec::new("Expenses", "expenses").render(Render::Currency))
                .column(ColumnSpec::new("Net", "net").sortable().render(Render::Currency)),
            Entity::StockReport => base
                .column(ColumnSpec::new("Product", "product.name").sort_by("product"))
                .column(ColumnSpec::new("Branch", "branch.name"))
                .column(ColumnSpec::new("On hand", "quantity").sortable().render(Render::Number))
                .column(ColumnSpec::new("Value", "value").sortable().render(Render::Currency))
                .search(["product"])
                .populate(["product", "branch"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for entity in Entity::all() {
            assert!(seen.insert(entity.slug()), "duplicate slug {}", entity.slug());
            assert_eq!(Entity::from_slug(entity.slug()), Some(*entity));
        }
        assert_eq!(Entity::from_slug("nope"), None);
    }

    #[test]
    fn every_descriptor_has_columns_and_its_base_path() {
        for entity in Entity::all() {
            let descriptor = entity.descriptor();
            assert!(!descriptor.columns.is_empty(), "{} has no columns", entity.slug());
            assert_eq!(descriptor.base_path, entity.base_path());
            assert!(descriptor.base_path.starts_with('/'));
        }
    }

    #[test]
    fn reports_live_under_reports_and_are_read_only() {
        for entity in Entity::all() {
            assert_eq!(entity.descriptor().read_only, entity.is_report(), "{}", entity.slug());
            if entity.is_report() {
                assert!(entity.base_path().starts_with("/reports/"));
            }
        }
        assert_eq!(Entity::Branches.base_path(), "/branches");
    }
}
